use jiff::civil::{Date, DateTime};

/// Text form used for every persisted timestamp: local time, minute precision.
pub const FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD HH:MM")]
    Invalid(String),
}

/// Current local time with seconds dropped.
pub fn now() -> DateTime {
    truncate(jiff::Zoned::now().datetime())
}

/// Current local date.
pub fn today() -> Date {
    jiff::Zoned::now().date()
}

pub fn truncate(datetime: DateTime) -> DateTime {
    datetime.date().at(datetime.hour(), datetime.minute(), 0, 0)
}

pub fn format(datetime: DateTime) -> String {
    datetime.strftime(FORMAT).to_string()
}

pub fn parse(text: &str) -> Result<DateTime, TimestampError> {
    DateTime::strptime(FORMAT, text).map_err(|_| TimestampError::Invalid(text.to_string()))
}

/// Accepts what a person types at a prompt: `2030-01-25T23:59`,
/// `2030-01-25 23:59` or a bare `2030-01-25` (midnight).
pub fn parse_user_input(text: &str) -> Result<DateTime, TimestampError> {
    let trimmed = text.trim();

    if let Ok(datetime) = parse(trimmed) {
        return Ok(datetime);
    }
    if let Ok(datetime) = DateTime::strptime("%Y-%m-%d %H:%M", trimmed) {
        return Ok(truncate(datetime));
    }
    trimmed
        .parse::<Date>()
        .map(|date| date.at(0, 0, 0, 0))
        .map_err(|_| TimestampError::Invalid(text.to_string()))
}

/// Serde adapter for `DateTime` fields stored as `YYYY-MM-DDTHH:MM`.
pub mod minute {
    use jiff::civil::DateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse(&text).map_err(D::Error::custom)
    }

    /// Same as the parent module, with `null` standing for `None`.
    pub mod option {
        use jiff::civil::DateTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(datetime) => serializer.serialize_str(&super::super::format(*datetime)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) => super::super::parse(&text).map(Some).map_err(D::Error::custom),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_format_is_zero_padded_minutes() {
        let datetime = date(2030, 1, 5).at(9, 3, 0, 0);
        assert_eq!(format(datetime), "2030-01-05T09:03");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse("tomorrow"),
            Err(TimestampError::Invalid("tomorrow".to_string()))
        );
    }

    #[test]
    fn test_truncate_drops_seconds() {
        let datetime = date(2030, 1, 5).at(9, 3, 42, 123);
        assert_eq!(truncate(datetime), date(2030, 1, 5).at(9, 3, 0, 0));
    }

    #[test]
    fn test_parse_user_input_formats() {
        let expected = date(2023, 1, 25).at(23, 59, 0, 0);
        assert_eq!(parse_user_input("2023-01-25T23:59").unwrap(), expected);
        assert_eq!(parse_user_input(" 2023-01-25 23:59 ").unwrap(), expected);
        assert_eq!(
            parse_user_input("2023-01-25").unwrap(),
            date(2023, 1, 25).at(0, 0, 0, 0)
        );
        assert!(parse_user_input("25/01/2023").is_err());
    }

    #[test]
    fn test_now_has_no_seconds() {
        let current = now();
        assert_eq!(current.second(), 0);
        assert_eq!(current.subsec_nanosecond(), 0);
    }
}
