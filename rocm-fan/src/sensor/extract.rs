//! Field extraction from the vendor tool's text output.
//!
//! Not a parser. A field is a literal label followed by a value that runs up
//! to a terminator substring (or end of text). The captured text is read as
//! a base-10 integer the way the tool prints it: leading whitespace, an
//! optional sign, then digits; anything after the digits is ignored, so
//! `" 45.0"` reads as 45.

use thiserror::Error;

/// Reasons a field could not be pulled out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("failed to find {label:?}")]
    MissingLabel { label: &'static str },

    #[error("failed to parse number from {text:?}")]
    InvalidNumber { text: String },

    #[error("{value} is out of range")]
    OutOfRange { value: i64 },
}

/// A labelled value in the tool's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Short name used in log events.
    pub name: &'static str,
    pub label: &'static str,
    pub terminator: &'static str,
}

pub const EDGE: Field = Field {
    name: "edge",
    label: "Temperature (Sensor edge) (C):",
    terminator: "\n",
};

pub const JUNCTION: Field = Field {
    name: "junction",
    label: "Temperature (Sensor junction) (C):",
    terminator: "\n",
};

pub const MEMORY: Field = Field {
    name: "memory",
    label: "Temperature (Sensor memory) (C):",
    terminator: "\n",
};

pub const FAN_LEVEL: Field = Field {
    name: "fan_level",
    label: "Fan Level:",
    terminator: "(",
};

impl Field {
    /// Raw value text following the label, if the label is present.
    pub fn locate<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = text.find(self.label)? + self.label.len();
        let rest = &text[start..];
        let end = rest.find(self.terminator).unwrap_or(rest.len());
        Some(&rest[..end])
    }

    /// Locate and parse the field as an integer.
    pub fn extract(&self, text: &str) -> Result<i64, ExtractError> {
        let raw = self
            .locate(text)
            .ok_or(ExtractError::MissingLabel { label: self.label })?;

        parse_leading_int(raw).ok_or_else(|| ExtractError::InvalidNumber {
            text: raw.to_string(),
        })
    }

    /// Locate and parse the field, requiring the value to fit in `T`.
    pub fn extract_as<T: TryFrom<i64>>(&self, text: &str) -> Result<T, ExtractError> {
        let value = self.extract(text)?;
        T::try_from(value).map_err(|_| ExtractError::OutOfRange { value })
    }
}

/// Read a leading base-10 integer, ignoring whatever follows the digits.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let len = digits
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }

    let magnitude: i64 = digits[..len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const OUTPUT: &str = "Temperature (Sensor edge) (C): 45.0\n\
                          Temperature (Sensor junction) (C): 47.0\n\
                          Temperature (Sensor memory) (C): 52.0\n\
                          Fan Level: 104 (41%)\n\
                          Fan RPM: 1234";

    #[test_case("45", Some(45); "plain")]
    #[test_case(" 45.0", Some(45); "fraction ignored")]
    #[test_case("\t-7 ", Some(-7); "negative")]
    #[test_case("+12", Some(12); "explicit plus")]
    #[test_case(" 104 ", Some(104); "trailing space")]
    #[test_case("", None; "empty")]
    #[test_case(" N/A", None; "not a number")]
    #[test_case("-", None; "sign only")]
    #[test_case("99999999999999999999", None; "overflow")]
    fn should_parse_leading_int(text: &str, expected: Option<i64>) {
        assert_eq!(parse_leading_int(text), expected);
    }

    #[test]
    fn should_locate_value_up_to_terminator() {
        assert_eq!(EDGE.locate(OUTPUT), Some(" 45.0"));
        assert_eq!(FAN_LEVEL.locate(OUTPUT), Some(" 104 "));
    }

    #[test]
    fn should_run_to_end_of_text_without_terminator() {
        let text = "Temperature (Sensor memory) (C): 52.0";

        assert_eq!(MEMORY.locate(text), Some(" 52.0"));
        assert_eq!(MEMORY.extract(text), Ok(52));
    }

    #[test]
    fn should_extract_every_field() {
        assert_eq!(EDGE.extract(OUTPUT), Ok(45));
        assert_eq!(JUNCTION.extract(OUTPUT), Ok(47));
        assert_eq!(MEMORY.extract(OUTPUT), Ok(52));
        assert_eq!(FAN_LEVEL.extract_as::<u8>(OUTPUT), Ok(104));
    }

    #[test]
    fn should_report_missing_label() {
        let result = JUNCTION.extract("Temperature (Sensor edge) (C): 45.0\n");

        assert_eq!(
            result,
            Err(ExtractError::MissingLabel {
                label: JUNCTION.label
            })
        );
    }

    #[test]
    fn should_report_invalid_number_with_raw_text() {
        let result = EDGE.extract("Temperature (Sensor edge) (C): N/A\n");

        assert_eq!(
            result,
            Err(ExtractError::InvalidNumber {
                text: " N/A".to_string()
            })
        );
    }

    #[test]
    fn should_reject_fan_level_outside_u8() {
        let result = FAN_LEVEL.extract_as::<u8>("Fan Level: 300 (117%)\n");

        assert_eq!(result, Err(ExtractError::OutOfRange { value: 300 }));
    }
}
