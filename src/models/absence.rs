use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::absences;

/// A user's out-of-office window. One row per user, mutated in place on
/// subsequent updates.
#[derive(Debug, Clone, Serialize)]
pub struct Absence {
    pub id: i32,

    pub user_id: String,

    pub first_day: NaiveDate,

    pub last_day: NaiveDate,

    pub short_message: String,

    pub message: String,
}

impl TryFrom<absences::Model> for Absence {
    type Error = chrono::ParseError;

    fn try_from(m: absences::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            first_day: NaiveDate::parse_from_str(&m.first_day, "%Y-%m-%d")?,
            last_day: NaiveDate::parse_from_str(&m.last_day, "%Y-%m-%d")?,
            short_message: m.short_message,
            message: m.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_entity_dates() {
        let model = absences::Model {
            id: 7,
            user_id: "alice".to_string(),
            first_day: "2026-03-02".to_string(),
            last_day: "2026-03-06".to_string(),
            short_message: "Vacation".to_string(),
            message: "Back next week".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };

        let absence = Absence::try_from(model).unwrap();
        assert_eq!(absence.id, 7);
        assert_eq!(
            absence.first_day,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
        assert_eq!(
            absence.last_day,
            NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        let model = absences::Model {
            id: 1,
            user_id: "bob".to_string(),
            first_day: "02.03.2026".to_string(),
            last_day: "2026-03-06".to_string(),
            short_message: String::new(),
            message: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        };

        assert!(Absence::try_from(model).is_err());
    }
}
