//! [`JsonValue`] — the in-memory document tree queried by expressions.
//!
//! Every operation is defined for all seven kinds and fails with an
//! [`OperationError`] where the kind does not support it.

use std::fmt;

use indexmap::IndexMap;

use crate::error::OperationError;

/// A parsed JSON value. Containers own their children.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    /// Number written without a decimal point.
    Int(i64),
    /// Number written with a decimal point.
    Float(f64),
    String(String),
    Array(Vec<JsonValue>),
    /// Keys are unique. Equality ignores key order.
    Object(IndexMap<String, JsonValue>),
}

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

impl Extremum {
    fn name(self) -> &'static str {
        match self {
            Extremum::Min => "min",
            Extremum::Max => "max",
        }
    }

    fn beats(self, candidate: f64, best: f64) -> bool {
        match self {
            Extremum::Min => candidate < best,
            Extremum::Max => candidate > best,
        }
    }
}

impl JsonValue {
    /// Name of the value's kind, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "bool",
            JsonValue::Int(_) => "int",
            JsonValue::Float(_) => "float",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }

    /// Debug rendering; same as the `Display` output.
    ///
    /// Strings are quoted but not escaped, so the result is not always valid JSON.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn as_number(&self) -> Result<f64, OperationError> {
        match self {
            JsonValue::Int(i) => Ok(*i as f64),
            JsonValue::Float(f) => Ok(*f),
            other => Err(OperationError::TypeError(format!(
                "cannot treat {} as number",
                other.kind()
            ))),
        }
    }

    /// Integer view of the value. Floats are rejected rather than truncated.
    pub fn as_int(&self) -> Result<i64, OperationError> {
        match self {
            JsonValue::Int(i) => Ok(*i),
            other => Err(OperationError::TypeError(format!(
                "cannot treat {} as int",
                other.kind()
            ))),
        }
    }

    pub fn index(&self, index: i64) -> Result<&JsonValue, OperationError> {
        match self {
            JsonValue::Array(arr) => usize::try_from(index)
                .ok()
                .and_then(|i| arr.get(i))
                .ok_or(OperationError::IndexError {
                    index,
                    len: arr.len(),
                }),
            other => Err(OperationError::TypeError(format!(
                "cannot index {} by int",
                other.kind()
            ))),
        }
    }

    pub fn key(&self, key: &str) -> Result<&JsonValue, OperationError> {
        match self {
            JsonValue::Object(map) => map
                .get(key)
                .ok_or_else(|| OperationError::KeyError(key.to_string())),
            other => Err(OperationError::TypeError(format!(
                "cannot index {} by key",
                other.kind()
            ))),
        }
    }

    /// Character count of a string, element count of an array, key count of an object.
    pub fn size(&self) -> Result<usize, OperationError> {
        match self {
            JsonValue::String(s) => Ok(s.chars().count()),
            JsonValue::Array(arr) => Ok(arr.len()),
            JsonValue::Object(map) => Ok(map.len()),
            other => Err(OperationError::TypeError(format!(
                "cannot take size of {}",
                other.kind()
            ))),
        }
    }

    /// Smallest element of an array; the first one wins on ties.
    pub fn min(&self) -> Result<&JsonValue, OperationError> {
        self.extremum(Extremum::Min)
    }

    /// Largest element of an array; the first one wins on ties.
    pub fn max(&self) -> Result<&JsonValue, OperationError> {
        self.extremum(Extremum::Max)
    }

    fn extremum(&self, which: Extremum) -> Result<&JsonValue, OperationError> {
        let arr = match self {
            JsonValue::Array(arr) => arr,
            other => {
                return Err(OperationError::TypeError(format!(
                    "cannot take {} of {}",
                    which.name(),
                    other.kind()
                )))
            }
        };
        let (first, rest) = arr
            .split_first()
            .ok_or(OperationError::EmptyCollection(which.name()))?;
        let mut best = first;
        let mut best_val = first.as_number()?;
        for item in rest {
            let val = item.as_number()?;
            if which.beats(val, best_val) {
                best = item;
                best_val = val;
            }
        }
        Ok(best)
    }
}

/// Picks the extremal value out of a list of arguments, comparing them as numbers.
///
/// Returns the index of the winner; the first one wins on ties.
pub(crate) fn extremum_position<'v>(
    items: impl IntoIterator<Item = &'v JsonValue>,
    min: bool,
) -> Result<usize, OperationError> {
    let which = if min { Extremum::Min } else { Extremum::Max };
    let mut best: Option<(usize, f64)> = None;
    for (i, item) in items.into_iter().enumerate() {
        let val = item.as_number()?;
        match best {
            Some((_, best_val)) if !which.beats(val, best_val) => {}
            _ => best = Some((i, val)),
        }
    }
    best.map(|(i, _)| i)
        .ok_or(OperationError::EmptyCollection(which.name()))
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValue::Null => f.write_str("null"),
            JsonValue::Bool(b) => write!(f, "{b}"),
            JsonValue::Int(i) => write!(f, "{i}"),
            // Display never switches to exponent form; whole floats get `.0`.
            JsonValue::Float(x) if x.is_finite() => {
                write!(f, "{x}")?;
                if x.fract() == 0.0 {
                    f.write_str(".0")?;
                }
                Ok(())
            }
            JsonValue::Float(_) => f.write_str("null"),
            JsonValue::String(s) => write!(f, "\"{s}\""),
            JsonValue::Array(arr) => {
                f.write_str("[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            JsonValue::Object(map) => {
                f.write_str("{")?;
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{key}\": {val}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => JsonValue::Int(i),
                None => JsonValue::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(arr) => {
                JsonValue::Array(arr.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(obj) => JsonValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&JsonValue> for serde_json::Value {
    fn from(v: &JsonValue) -> Self {
        match v {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(*b),
            JsonValue::Int(i) => serde_json::Value::from(*i),
            // Non-finite floats have no JSON form.
            JsonValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            JsonValue::String(s) => serde_json::Value::String(s.clone()),
            JsonValue::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(serde_json::Value::from).collect())
            }
            JsonValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for serde_json::Value {
    fn from(v: JsonValue) -> Self {
        serde_json::Value::from(&v)
    }
}
