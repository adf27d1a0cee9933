use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sift_core::FieldValue;

/// Columns the pipeline transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Text,
    Subject,
    Date,
    Label,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Text,
        Field::Subject,
        Field::Date,
        Field::Label,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Text => "text",
            Field::Subject => "subject",
            Field::Date => "date",
            Field::Label => "label",
        }
    }

    pub fn from_column(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns appended to every normalized row
pub const DATE_PART_COLUMNS: [&str; 3] = ["year", "month", "day"];

// Keeps a present-but-null column distinct from a missing one
fn present<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    FieldValue::deserialize(deserializer).map(Some)
}

/// One input row. `None` means the column is not in the row at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<FieldValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub text: Option<FieldValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub subject: Option<FieldValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub label: Option<FieldValue>,
    /// Columns passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawRecord {
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        match field {
            Field::Title => self.title.as_ref(),
            Field::Text => self.text.as_ref(),
            Field::Subject => self.subject.as_ref(),
            Field::Date => self.date.as_ref(),
            Field::Label => self.label.as_ref(),
        }
    }

    pub fn set(&mut self, field: Field, value: FieldValue) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Text => &mut self.text,
            Field::Subject => &mut self.subject,
            Field::Date => &mut self.date,
            Field::Label => &mut self.label,
        };
        *slot = Some(value);
    }

    /// Set a column by name; unknown names go to the passthrough columns
    pub fn set_column(&mut self, name: &str, value: FieldValue) {
        match Field::from_column(name) {
            Some(field) => self.set(field, value),
            None => {
                let json = serde_json::to_value(&value).unwrap_or(Value::Null);
                self.extra.insert(name.to_string(), json);
            }
        }
    }

    /// Names of the columns present in this row: known columns first, then passthrough
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::with_capacity(Field::ALL.len() + self.extra.len());
        for field in Field::ALL {
            if self.get(field).is_some() {
                columns.push(field.as_str());
            }
        }
        for name in self.extra.keys() {
            columns.push(name.as_str());
        }
        columns
    }
}

/// Calendar date split into its parts. Either all three are known or none is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for DateParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// One output row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    pub title: String,
    pub text: String,
    pub subject: String,
    pub date: Option<DateParts>,
    pub label: Option<u8>,
    pub extra: Map<String, Value>,
}

impl NormalizedRecord {
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year)
    }

    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month)
    }

    pub fn day(&self) -> Option<u32> {
        self.date.map(|d| d.day)
    }

    /// Output row holding `columns` in order, followed by `year`, `month`, `day`.
    ///
    /// Transformed columns take their normalized value; any other column is
    /// copied from the passthrough columns.
    pub fn to_row<S: AsRef<str>>(&self, columns: &[S]) -> Map<String, Value> {
        let mut row = Map::new();

        for column in columns {
            let column: &str = column.as_ref();
            if DATE_PART_COLUMNS.contains(&column) {
                continue;
            }
            let value = match Field::from_column(column) {
                Some(Field::Title) => Value::from(self.title.as_str()),
                Some(Field::Text) => Value::from(self.text.as_str()),
                Some(Field::Subject) => Value::from(self.subject.as_str()),
                Some(Field::Date) => self
                    .date
                    .map(|d| Value::from(d.to_string()))
                    .unwrap_or(Value::Null),
                Some(Field::Label) => self.label.map(Value::from).unwrap_or(Value::Null),
                None => self.extra.get(column).cloned().unwrap_or(Value::Null),
            };
            row.insert(column.to_string(), value);
        }

        row.insert("year".to_string(), self.year().map(Value::from).unwrap_or(Value::Null));
        row.insert("month".to_string(), self.month().map(Value::from).unwrap_or(Value::Null));
        row.insert("day".to_string(), self.day().map(Value::from).unwrap_or(Value::Null));
        row
    }
}
