//! iCalendar and vCard extraction for the search providers.

pub mod ics;
pub mod vcard;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unreadable object: {0}")]
    Syntax(String),

    #[error("Object has no {0} component")]
    MissingComponent(&'static str),

    #[error("Invalid {name} value: {value}")]
    InvalidValue { name: &'static str, value: String },
}
