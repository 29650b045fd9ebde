pub mod absence;
pub mod jobs;
pub mod search;
