use std::io::BufReader;

use ical::parser::vcard::component::VcardContact;
use ical::property::Property;

use super::ParseError;

/// The subset of a vCard the contacts provider displays.
#[derive(Debug, Clone)]
pub struct ParsedContact {
    pub full_name: Option<String>,

    /// First EMAIL value, if any.
    pub email: Option<String>,

    pub uid: Option<String>,

    pub has_photo: bool,
}

pub fn parse_contact(data: &str) -> Result<ParsedContact, ParseError> {
    let contact = first_contact(data)?;

    Ok(ParsedContact {
        full_name: property_value(&contact.properties, "FN"),
        email: property_value(&contact.properties, "EMAIL"),
        uid: property_value(&contact.properties, "UID"),
        has_photo: contact.properties.iter().any(|p| p.name == "PHOTO"),
    })
}

fn first_contact(data: &str) -> Result<VcardContact, ParseError> {
    let reader = BufReader::new(data.as_bytes());

    ical::VcardParser::new(reader)
        .next()
        .ok_or(ParseError::MissingComponent("VCARD"))?
        .map_err(|e| ParseError::Syntax(e.to_string()))
}

fn property_value(properties: &[Property], name: &str) -> Option<String> {
    properties
        .iter()
        .find(|p| p.name == name)
        .and_then(|p| p.value.clone())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CARD: &str = "BEGIN:VCARD\r\nVERSION:3.0\r\nUID:c1\r\nFN:Erika Mustermann\r\nEMAIL;TYPE=WORK:erika@example.com\r\nEMAIL;TYPE=HOME:em@example.org\r\nPHOTO;ENCODING=b;TYPE=JPEG:MTIzNDU2\r\nEND:VCARD\r\n";

    const SPARSE_CARD: &str =
        "BEGIN:VCARD\r\nVERSION:3.0\r\nUID:c2\r\nN:Mustermann;Max;;;\r\nEND:VCARD\r\n";

    #[test]
    fn extracts_display_fields() {
        let contact = parse_contact(FULL_CARD).unwrap();
        assert_eq!(contact.full_name.as_deref(), Some("Erika Mustermann"));
        assert_eq!(contact.email.as_deref(), Some("erika@example.com"));
        assert_eq!(contact.uid.as_deref(), Some("c1"));
        assert!(contact.has_photo);
    }

    #[test]
    fn missing_fields_stay_empty() {
        let contact = parse_contact(SPARSE_CARD).unwrap();
        assert_eq!(contact.full_name, None);
        assert_eq!(contact.email, None);
        assert!(!contact.has_photo);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_contact("BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").is_err());
    }
}
