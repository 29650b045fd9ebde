pub mod prelude;

pub mod absences;
pub mod address_books;
pub mod calendar_object_properties;
pub mod calendar_objects;
pub mod calendar_subscriptions;
pub mod calendars;
pub mod card_properties;
pub mod cards;
pub mod scheduled_jobs;
pub mod user_settings;
