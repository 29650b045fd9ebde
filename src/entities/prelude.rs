pub use super::absences::Entity as Absences;
pub use super::address_books::Entity as AddressBooks;
pub use super::calendar_object_properties::Entity as CalendarObjectProperties;
pub use super::calendar_objects::Entity as CalendarObjects;
pub use super::calendar_subscriptions::Entity as CalendarSubscriptions;
pub use super::calendars::Entity as Calendars;
pub use super::card_properties::Entity as CardProperties;
pub use super::cards::Entity as Cards;
pub use super::scheduled_jobs::Entity as ScheduledJobs;
pub use super::user_settings::Entity as UserSettings;
