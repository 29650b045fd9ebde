pub mod absence;
pub mod addressbook;
pub mod calendar;
pub mod jobs;
pub mod settings;
