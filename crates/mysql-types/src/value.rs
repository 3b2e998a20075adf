//! Dynamically-typed parameter values.

use bytes::Bytes;

/// A dynamically-typed MySQL value.
///
/// This is the parameter representation handed to the connection boundary:
/// a closed set of tagged variants rather than open polymorphism, covering
/// the types the binary protocol can bind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,

    /// Signed 64-bit integer (covers TINYINT through BIGINT).
    Int(i64),

    /// Unsigned 64-bit integer (BIGINT UNSIGNED).
    UInt(u64),

    /// 32-bit floating point (FLOAT).
    Float(f32),

    /// 64-bit floating point (DOUBLE).
    Double(f64),

    /// Text string (CHAR, VARCHAR, TEXT).
    Text(String),

    /// Binary data (BINARY, VARBINARY, BLOB).
    Bytes(Bytes),

    /// Calendar date and time (DATE, DATETIME, TIMESTAMP).
    Date {
        /// Year (e.g. 2024).
        year: u16,
        /// Month, 1-12.
        month: u8,
        /// Day of month, 1-31.
        day: u8,
        /// Hour, 0-23.
        hour: u8,
        /// Minute, 0-59.
        minute: u8,
        /// Second, 0-59.
        second: u8,
        /// Microseconds, 0-999999.
        micro: u32,
    },

    /// Elapsed time, possibly negative (TIME).
    Time {
        /// Whether the interval is negative.
        negative: bool,
        /// Whole hours; may exceed 23.
        hours: u32,
        /// Minutes, 0-59.
        minutes: u8,
        /// Seconds, 0-59.
        seconds: u8,
        /// Microseconds, 0-999999.
        micro: u32,
    },
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the MySQL type name of this value.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Int(_) => "BIGINT",
            Value::UInt(_) => "BIGINT UNSIGNED",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BLOB",
            Value::Date { .. } => "DATETIME",
            Value::Time { .. } => "TIME",
        }
    }

    /// Try to view this value as a signed integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to view this value as an unsigned integer.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to view this value as a double-precision float.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to view this value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Try to view this value as raw bytes.
    ///
    /// Text values are visible through this accessor as well, since the
    /// wire representation of both is a length-prefixed byte run.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            Value::Text(v) => Some(v.as_bytes()),
            _ => None,
        }
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UInt(u64::from(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::UInt(u64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(u64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_detection() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(0).is_null());
        assert!(Value::from(None::<i64>).is_null());
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(Value::from(7i32), Value::Int(7));
        assert_eq!(Value::from(7u32), Value::UInt(7));
        assert_eq!(Value::from(true), Value::Int(1));

        assert_eq!(Value::Int(-1).as_i64(), Some(-1));
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
    }

    #[test]
    fn test_text_and_bytes() {
        let text = Value::from("hello");
        assert_eq!(text.as_str(), Some("hello"));
        assert_eq!(text.as_bytes(), Some(&b"hello"[..]));

        let blob = Value::from(vec![0xDEu8, 0xAD]);
        assert_eq!(blob.as_bytes(), Some(&[0xDE, 0xAD][..]));
        assert_eq!(blob.as_str(), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "NULL");
        assert_eq!(Value::Double(1.0).type_name(), "DOUBLE");
        assert_eq!(
            Value::Time {
                negative: false,
                hours: 1,
                minutes: 2,
                seconds: 3,
                micro: 0,
            }
            .type_name(),
            "TIME"
        );
    }
}
