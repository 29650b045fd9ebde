//! Domain primitives shared across services.

pub mod events;

use std::fmt;
use std::str::FromStr;

/// DAV principal URI for a user, the owner identifier for calendars and
/// address books.
#[must_use]
pub fn principal_uri(user_id: &str) -> String {
    format!("principals/users/{user_id}")
}

/// Which edge of an absence window a one-shot job fires for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsenceEventKind {
    Start,
    End,
}

impl AbsenceEventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for AbsenceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbsenceEventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(UnknownEventKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind(pub String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown absence event kind: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_uri_format() {
        assert_eq!(principal_uri("alice"), "principals/users/alice");
    }

    #[test]
    fn event_kind_round_trip() {
        assert_eq!(AbsenceEventKind::Start.as_str(), "start");
        assert_eq!("end".parse::<AbsenceEventKind>(), Ok(AbsenceEventKind::End));
        assert!("middle".parse::<AbsenceEventKind>().is_err());
    }
}
