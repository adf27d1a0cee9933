use serde::{Deserialize, Serialize};

/// A single cell as it arrives from the tabular boundary.
///
/// Columns are loosely typed in the source datasets: a title can be missing,
/// numeric or boolean as easily as it can be text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    /// Build a value from a raw delimited-text cell. Empty cells are missing values.
    pub fn from_cell(cell: &str) -> Self {
        if cell.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::Text(cell.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Short type name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Other(value) if value.is_array() => "array",
            FieldValue::Other(_) => "object",
        }
    }

    /// String form used when every cell is coerced to text before cleaning.
    /// Missing values render as `nan`, booleans as `True`/`False`.
    pub fn to_coerced_string(&self) -> String {
        match self {
            FieldValue::Null => "nan".to_string(),
            FieldValue::Bool(true) => "True".to_string(),
            FieldValue::Bool(false) => "False".to_string(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Float(x) if x.is_nan() => "nan".to_string(),
            FieldValue::Float(x) if x.is_finite() && x.fract() == 0.0 => format!("{x:.1}"),
            FieldValue::Float(x) => x.to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Other(value) => value.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n
                    .as_f64()
                    .map(FieldValue::Float)
                    .unwrap_or(FieldValue::Other(serde_json::Value::Number(n))),
            },
            other => FieldValue::Other(other),
        }
    }
}
