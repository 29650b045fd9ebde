pub mod apps;
pub use apps::AppGate;

pub mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

pub mod timezone;
pub use timezone::TimezoneService;

pub mod search_provider;
pub use search_provider::{SearchError, SearchProvider, SearchQuery};

pub mod contacts_search;
pub use contacts_search::ContactsSearchProvider;

pub mod events_search;
pub use events_search::EventsSearchProvider;

pub mod tasks_search;
pub use tasks_search::TasksSearchProvider;

pub mod absence_service;
pub use absence_service::{AbsenceError, AbsenceService};

pub mod absence_service_impl;
pub use absence_service_impl::SeaOrmAbsenceService;

pub mod scheduler;
pub use scheduler::Scheduler;
