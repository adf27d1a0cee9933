use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sift_core::FieldValue;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A field that is present but cannot be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedField {
    #[error("unparsable date {0:?}")]
    UnparsableDate(String),

    #[error("unrecognized label {0:?}")]
    UnrecognizedLabel(String),

    #[error("expected text, found {0}")]
    NonText(&'static str),
}

/// Outcome of reading one auxiliary field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome<T> {
    /// Column missing or value missing
    Absent,
    /// Value present but unusable
    Invalid(MalformedField),
    Valid(T),
}

impl<T> FieldOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldOutcome<U> {
        match self {
            FieldOutcome::Absent => FieldOutcome::Absent,
            FieldOutcome::Invalid(e) => FieldOutcome::Invalid(e),
            FieldOutcome::Valid(value) => FieldOutcome::Valid(f(value)),
        }
    }
}

/// Lowercase and trim the subject
pub fn normalize_subject(value: Option<&FieldValue>) -> FieldOutcome<String> {
    match value {
        None | Some(FieldValue::Null) => FieldOutcome::Absent,
        Some(FieldValue::Text(text)) => FieldOutcome::Valid(text.to_lowercase().trim().to_string()),
        Some(other) => FieldOutcome::Invalid(MalformedField::NonText(other.kind())),
    }
}

/// Parse a calendar date, accepting the layouts found in news datasets
pub fn parse_date(value: Option<&FieldValue>) -> FieldOutcome<NaiveDate> {
    match value {
        None | Some(FieldValue::Null) => FieldOutcome::Absent,
        Some(FieldValue::Text(text)) if text.trim().is_empty() => FieldOutcome::Absent,
        Some(FieldValue::Text(text)) => match parse_date_str(text) {
            Some(date) => FieldOutcome::Valid(date),
            None => FieldOutcome::Invalid(MalformedField::UnparsableDate(text.clone())),
        },
        Some(other) => FieldOutcome::Invalid(MalformedField::NonText(other.kind())),
    }
}

pub fn parse_date_str(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Some(date) = parse_compact(text) {
        return Some(date);
    }

    let dated = undot_month(text);
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&dated, format).ok())
    {
        return Some(date);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|datetime| datetime.date())
}

/// `YYYYMMDD`
fn parse_compact(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month abbreviations as chrono reads them: "Sept. 14" -> "Sep 14"
fn undot_month(text: &str) -> Cow<'_, str> {
    if !text.contains('.') && !text.to_ascii_lowercase().contains("sept ") {
        return Cow::Borrowed(text);
    }

    let words: Vec<&str> = text
        .split_whitespace()
        .map(|word| {
            let stem = word.strip_suffix('.').unwrap_or(word);
            if stem.eq_ignore_ascii_case("sept") {
                "Sep"
            } else if stem.len() >= 3 && stem.chars().all(|c| c.is_ascii_alphabetic()) {
                stem
            } else {
                word
            }
        })
        .collect();
    Cow::Owned(words.join(" "))
}

/// `real` -> 1, `fake` -> 0. Case-sensitive; anything else is unrecognized.
pub fn encode_label(value: Option<&FieldValue>) -> FieldOutcome<u8> {
    match value {
        None | Some(FieldValue::Null) => FieldOutcome::Absent,
        Some(FieldValue::Text(text)) => match text.as_str() {
            "real" => FieldOutcome::Valid(1),
            "fake" => FieldOutcome::Valid(0),
            other => FieldOutcome::Invalid(MalformedField::UnrecognizedLabel(other.to_string())),
        },
        Some(other) => {
            FieldOutcome::Invalid(MalformedField::UnrecognizedLabel(other.to_coerced_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> FieldValue {
        FieldValue::from(value)
    }

    #[test]
    fn parses_dataset_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2017, 12, 31);

        for layout in [
            "2017-12-31",
            "2017/12/31",
            "12/31/2017",
            "12-31-2017",
            "December 31, 2017",
            "December 31, 2017 ",
            "Dec 31, 2017",
            "31 December 2017",
            "31-Dec-17",
            "2017-12-31T08:30:00Z",
            "2017-12-31 08:30:00",
            "2017-12-31 08:30:00.123",
            "2017-12-31T08:30:00.5",
            "20171231",
            "Dec. 31, 2017",
        ] {
            assert_eq!(parse_date_str(layout), expected, "layout {layout:?}");
        }
    }

    #[test]
    fn dotted_month_abbreviations() {
        assert_eq!(parse_date_str("Sept. 14, 2017"), NaiveDate::from_ymd_opt(2017, 9, 14));
        assert_eq!(parse_date_str("Sept 14, 2017"), NaiveDate::from_ymd_opt(2017, 9, 14));
        assert_eq!(parse_date_str("Sep. 14, 2017"), NaiveDate::from_ymd_opt(2017, 9, 14));
        assert_eq!(parse_date_str("14 Sept. 2017"), NaiveDate::from_ymd_opt(2017, 9, 14));
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(parse_date_str("2017-02-30"), None);
        assert_eq!(parse_date_str("20171331"), None);
        assert_eq!(parse_date_str("2017123"), None);
        assert_eq!(parse_date_str("not-a-date"), None);
        assert_eq!(parse_date_str("https://example.com/story"), None);
    }

    #[test]
    fn date_outcomes() {
        assert_eq!(
            parse_date(Some(&text("2020-03-15"))),
            FieldOutcome::Valid(NaiveDate::from_ymd_opt(2020, 3, 15).unwrap())
        );
        assert_eq!(
            parse_date(Some(&text("not-a-date"))),
            FieldOutcome::Invalid(MalformedField::UnparsableDate("not-a-date".to_string()))
        );
        assert_eq!(parse_date(None), FieldOutcome::Absent);
        assert_eq!(parse_date(Some(&FieldValue::Null)), FieldOutcome::Absent);
        assert_eq!(parse_date(Some(&text("  "))), FieldOutcome::Absent);
        assert_eq!(
            parse_date(Some(&FieldValue::Integer(20200315))),
            FieldOutcome::Invalid(MalformedField::NonText("integer"))
        );
    }

    #[test]
    fn label_mapping_is_exact() {
        assert_eq!(encode_label(Some(&text("real"))), FieldOutcome::Valid(1));
        assert_eq!(encode_label(Some(&text("fake"))), FieldOutcome::Valid(0));
        assert_eq!(
            encode_label(Some(&text("unknown"))),
            FieldOutcome::Invalid(MalformedField::UnrecognizedLabel("unknown".to_string()))
        );
        assert!(matches!(encode_label(Some(&text("Real"))), FieldOutcome::Invalid(_)));
        assert!(matches!(encode_label(Some(&FieldValue::Integer(1))), FieldOutcome::Invalid(_)));
        assert_eq!(encode_label(None), FieldOutcome::Absent);
    }

    #[test]
    fn subject_is_lowercased_and_trimmed() {
        assert_eq!(
            normalize_subject(Some(&text(" Business \n"))),
            FieldOutcome::Valid("business".to_string())
        );
        assert_eq!(
            normalize_subject(Some(&text("Middle-east"))),
            FieldOutcome::Valid("middle-east".to_string())
        );
        assert_eq!(
            normalize_subject(Some(&FieldValue::Bool(true))),
            FieldOutcome::Invalid(MalformedField::NonText("bool"))
        );
        assert_eq!(normalize_subject(None), FieldOutcome::Absent);
    }
}
