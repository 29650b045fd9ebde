use std::io::BufReader;
use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use ical::parser::ical::component::{IcalEvent, IcalTodo};
use ical::property::Property;
use regex::Regex;

use super::ParseError;

/// A DTSTART/DTEND/DUE/COMPLETED value. All-day values carry a date only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DateValue {
    #[must_use]
    pub const fn is_date_only(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// The value as a datetime, all-day dates at midnight.
    #[must_use]
    pub fn as_datetime(&self) -> NaiveDateTime {
        match self {
            Self::Date(d) => d.and_time(NaiveTime::MIN),
            Self::DateTime(dt) => *dt,
        }
    }
}

/// Start/end of a VEVENT with the DTEND/DURATION fallback chain applied.
#[derive(Debug, Clone, Copy)]
pub struct EventTimes {
    pub start: NaiveDateTime,

    pub end: NaiveDateTime,

    /// True when DTSTART was a date-only value.
    pub all_day: bool,
}

#[derive(Debug, Clone)]
pub struct ParsedEvent {
    pub summary: Option<String>,

    pub times: Option<EventTimes>,
}

#[derive(Debug, Clone)]
pub struct ParsedTask {
    pub summary: Option<String>,

    pub completed: Option<DateValue>,

    pub due: Option<DateValue>,
}

/// Extract the first VEVENT of an iCalendar stream.
pub fn parse_event(data: &str) -> Result<ParsedEvent, ParseError> {
    let event = first_event(data)?;

    let summary = property_value(&event.properties, "SUMMARY");
    let start = parsed_property(&event.properties, "DTSTART")?;
    let times = match start {
        Some(start) => Some(resolve_times(start, &event.properties)?),
        None => None,
    };

    Ok(ParsedEvent { summary, times })
}

/// Extract the first VTODO of an iCalendar stream.
pub fn parse_task(data: &str) -> Result<ParsedTask, ParseError> {
    let todo = first_todo(data)?;

    Ok(ParsedTask {
        summary: property_value(&todo.properties, "SUMMARY"),
        completed: parsed_property(&todo.properties, "COMPLETED")?,
        due: parsed_property(&todo.properties, "DUE")?,
    })
}

fn first_event(data: &str) -> Result<IcalEvent, ParseError> {
    let reader = BufReader::new(data.as_bytes());

    for calendar in ical::IcalParser::new(reader) {
        let calendar = calendar.map_err(|e| ParseError::Syntax(e.to_string()))?;
        if let Some(event) = calendar.events.into_iter().next() {
            return Ok(event);
        }
    }

    Err(ParseError::MissingComponent("VEVENT"))
}

fn first_todo(data: &str) -> Result<IcalTodo, ParseError> {
    let reader = BufReader::new(data.as_bytes());

    for calendar in ical::IcalParser::new(reader) {
        let calendar = calendar.map_err(|e| ParseError::Syntax(e.to_string()))?;
        if let Some(todo) = calendar.todos.into_iter().next() {
            return Ok(todo);
        }
    }

    Err(ParseError::MissingComponent("VTODO"))
}

fn find_property<'a>(properties: &'a [Property], name: &str) -> Option<&'a Property> {
    properties.iter().find(|p| p.name == name)
}

fn property_value(properties: &[Property], name: &str) -> Option<String> {
    find_property(properties, name)
        .and_then(|p| p.value.clone())
        .filter(|v| !v.is_empty())
}

fn parsed_property(
    properties: &[Property],
    name: &'static str,
) -> Result<Option<DateValue>, ParseError> {
    let Some(property) = find_property(properties, name) else {
        return Ok(None);
    };
    let Some(value) = property.value.as_deref().filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    parse_date_value(value, property, name).map(Some)
}

/// RFC 5545 DATE ("20161005") or DATE-TIME ("20160816T090000", optional
/// trailing Z). A VALUE=DATE parameter forces date-only interpretation.
fn parse_date_value(
    value: &str,
    property: &Property,
    name: &'static str,
) -> Result<DateValue, ParseError> {
    let invalid = || ParseError::InvalidValue {
        name,
        value: value.to_string(),
    };

    if is_date_only(value, property) {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| invalid())?;
        return Ok(DateValue::Date(date));
    }

    let trimmed = value.strip_suffix('Z').unwrap_or(value);
    let datetime =
        NaiveDateTime::parse_from_str(trimmed, "%Y%m%dT%H%M%S").map_err(|_| invalid())?;

    Ok(DateValue::DateTime(datetime))
}

fn is_date_only(value: &str, property: &Property) -> bool {
    let declared_date = property.params.as_ref().is_some_and(|params| {
        params
            .iter()
            .any(|(key, values)| key == "VALUE" && values.iter().any(|v| v == "DATE"))
    });

    declared_date || (value.len() == 8 && value.chars().all(|c| c.is_ascii_digit()))
}

/// End resolution: DTEND, else DTSTART + DURATION, else DTSTART itself
/// (one day later for date-only starts, per RFC 5545's default duration).
fn resolve_times(start: DateValue, properties: &[Property]) -> Result<EventTimes, ParseError> {
    let all_day = start.is_date_only();
    let start = start.as_datetime();

    if let Some(end) = parsed_property(properties, "DTEND")? {
        return Ok(EventTimes {
            start,
            end: end.as_datetime(),
            all_day,
        });
    }

    if let Some(property) = find_property(properties, "DURATION")
        && let Some(value) = property.value.as_deref()
    {
        let duration = parse_duration(value).ok_or_else(|| ParseError::InvalidValue {
            name: "DURATION",
            value: value.to_string(),
        })?;
        return Ok(EventTimes {
            start,
            end: start + duration,
            all_day,
        });
    }

    let end = if all_day {
        start + Duration::days(1)
    } else {
        start
    };

    Ok(EventTimes {
        start,
        end,
        all_day,
    })
}

/// ISO-8601 duration as used by RFC 5545: weeks, days, and a time part.
/// Months and years are not valid in iCalendar durations.
#[must_use]
pub fn parse_duration(value: &str) -> Option<Duration> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?P<neg>-)?P(?:(?P<w>\d+)W)?(?:(?P<d>\d+)D)?(?:T(?:(?P<h>\d+)H)?(?:(?P<m>\d+)M)?(?:(?P<s>\d+)S)?)?$")
            .expect("Invalid regex pattern defined in code")
    });

    let caps = re.captures(value.trim())?;

    // A bare "P" matches the regex with every component absent; reject it.
    if ["w", "d", "h", "m", "s"]
        .iter()
        .all(|name| caps.name(name).is_none())
    {
        return None;
    }

    let part = |name: &str| -> i64 {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0)
    };

    let mut duration = Duration::weeks(part("w"))
        + Duration::days(part("d"))
        + Duration::hours(part("h"))
        + Duration::minutes(part("m"))
        + Duration::seconds(part("s"));

    if caps.name("neg").is_some() {
        duration = -duration;
    }

    Some(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMED_EVENT: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:ev1\r\nSUMMARY:Team sync\r\nDTSTART:20160816T090000\r\nDTEND:20160816T100000\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    const ALL_DAY_EVENT: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:ev2\r\nSUMMARY:Conference\r\nDTSTART;VALUE=DATE:20161005\r\nDTEND;VALUE=DATE:20161008\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    const DURATION_EVENT: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:ev3\r\nSUMMARY:Standup\r\nDTSTART:20160816T090000\r\nDURATION:PT1H30M\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    const BARE_EVENT: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:ev4\r\nDTSTART:20160816T090000\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    const COMPLETED_TASK: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VTODO\r\nUID:t1\r\nSUMMARY:File report\r\nCOMPLETED:20160817T143000Z\r\nEND:VTODO\r\nEND:VCALENDAR\r\n";

    const DUE_DATE_TASK: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VTODO\r\nUID:t2\r\nSUMMARY:Water plants\r\nDUE;VALUE=DATE:20160820\r\nEND:VTODO\r\nEND:VCALENDAR\r\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn timed_event_uses_dtend() {
        let event = parse_event(TIMED_EVENT).unwrap();
        assert_eq!(event.summary.as_deref(), Some("Team sync"));

        let times = event.times.unwrap();
        assert!(!times.all_day);
        assert_eq!(times.start, date(2016, 8, 16).and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(times.end, date(2016, 8, 16).and_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn all_day_event_is_flagged() {
        let event = parse_event(ALL_DAY_EVENT).unwrap();
        let times = event.times.unwrap();
        assert!(times.all_day);
        assert_eq!(times.start.date(), date(2016, 10, 5));
        assert_eq!(times.end.date(), date(2016, 10, 8));
    }

    #[test]
    fn duration_fallback_applies() {
        let event = parse_event(DURATION_EVENT).unwrap();
        let times = event.times.unwrap();
        assert_eq!(times.end, date(2016, 8, 16).and_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn missing_end_and_duration_collapses_to_start() {
        let event = parse_event(BARE_EVENT).unwrap();
        let times = event.times.unwrap();
        assert_eq!(times.start, times.end);
    }

    #[test]
    fn completed_task_has_instant() {
        let task = parse_task(COMPLETED_TASK).unwrap();
        assert_eq!(task.summary.as_deref(), Some("File report"));

        let completed = task.completed.unwrap();
        assert!(!completed.is_date_only());
        assert_eq!(
            completed.as_datetime(),
            date(2016, 8, 17).and_hms_opt(14, 30, 0).unwrap()
        );
    }

    #[test]
    fn due_date_only_is_date() {
        let task = parse_task(DUE_DATE_TASK).unwrap();
        let due = task.due.unwrap();
        assert!(due.is_date_only());
        assert_eq!(due.as_datetime().date(), date(2016, 8, 20));
    }

    #[test]
    fn event_data_without_vevent_is_rejected() {
        assert!(matches!(
            parse_event(COMPLETED_TASK),
            Err(ParseError::MissingComponent("VEVENT"))
        ));
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("PT1H"), Some(Duration::hours(1)));
        assert_eq!(
            parse_duration("P1DT2H"),
            Some(Duration::days(1) + Duration::hours(2))
        );
        assert_eq!(parse_duration("P2W"), Some(Duration::weeks(2)));
        assert_eq!(parse_duration("-PT15M"), Some(Duration::minutes(-15)));
        assert_eq!(parse_duration("1H"), None);
    }
}
