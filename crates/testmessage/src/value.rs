//! Setting values and the coercion rules applied on every write.

use crate::error::UnknownValueType;
use std::{fmt, str::FromStr};

/// Strings the host reads as boolean true (compared case-insensitively).
pub const TRUTHY: [&str; 6] = ["on", "yes", "y", "true", "t", "1"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    Integer,
    String,
}

impl ValueType {
    pub const ALL: [ValueType; 3] = [ValueType::Boolean, ValueType::Integer, ValueType::String];

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::String => "string",
        }
    }
}

impl FromStr for ValueType {
    type Err = UnknownValueType;

    /// Parse a declared type name; names are case-sensitive.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == name)
            .ok_or_else(|| UnknownValueType(name.to_string()))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::String(_) => ValueType::String,
        }
    }

    /// Convert to `ty`. Never fails: input that does not fit is normalized.
    pub fn coerce(self, ty: ValueType) -> Value {
        match ty {
            ValueType::Boolean => Value::Boolean(self.to_boolean()),
            ValueType::Integer => Value::Integer(self.to_integer()),
            ValueType::String => match self {
                Value::String(s) => Value::String(s),
                other => Value::String(other.to_string()),
            },
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn to_boolean(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::String(s) => parse_boolean(s),
        }
    }

    fn to_integer(&self) -> i64 {
        match self {
            Value::Boolean(b) => i64::from(*b),
            Value::Integer(n) => *n,
            Value::String(s) => parse_integer(s),
        }
    }
}

/// Renders the form written to the persisted store.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(true) => f.write_str("on"),
            Value::Boolean(false) => f.write_str("off"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// True for members of [`TRUTHY`] after trimming; false otherwise.
pub fn parse_boolean(input: &str) -> bool {
    let input = input.trim();
    TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(input))
}

/// Leading base-10 signed integer, skipping leading whitespace.
///
/// `"12abc"` gives 12 and input without leading digits gives 0. Values that
/// overflow saturate at the `i64` bounds.
pub fn parse_integer(input: &str) -> i64 {
    let input = input.trim_start();
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    let mut total: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(digit - b'0');
        total = if negative {
            total.saturating_mul(10).saturating_sub(digit)
        } else {
            total.saturating_mul(10).saturating_add(digit)
        };
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("7"), 7);
        assert_eq!(parse_integer("  -42"), -42);
        assert_eq!(parse_integer("+5"), 5);
        assert_eq!(parse_integer("12abc"), 12);
        assert_eq!(parse_integer("abc"), 0);
        assert_eq!(parse_integer(""), 0);
        assert_eq!(parse_integer("-"), 0);
        assert_eq!(parse_integer("1 2"), 1);
        assert_eq!(parse_integer("99999999999999999999"), i64::MAX);
        assert_eq!(parse_integer("-99999999999999999999"), i64::MIN);
    }

    #[test]
    fn test_parse_boolean() {
        for input in ["on", "YES", "y", "True", " t ", "1"] {
            assert!(parse_boolean(input), "{input:?} should be true");
        }
        for input in ["off", "no", "", "0", "2", "enabled"] {
            assert!(!parse_boolean(input), "{input:?} should be false");
        }
    }

    #[test]
    fn test_coerce_to_each_type() {
        assert_eq!(Value::from("3").coerce(ValueType::Integer), Value::Integer(3));
        assert_eq!(Value::from(true).coerce(ValueType::Integer), Value::Integer(1));
        assert_eq!(Value::from(0i64).coerce(ValueType::Boolean), Value::Boolean(false));
        assert_eq!(Value::from(-3i64).coerce(ValueType::Boolean), Value::Boolean(true));
        assert_eq!(Value::from("on").coerce(ValueType::Boolean), Value::Boolean(true));
        assert_eq!(Value::from(2i64).coerce(ValueType::String), Value::from("2"));
        assert_eq!(Value::from(false).coerce(ValueType::String), Value::from("off"));
        assert_eq!(Value::from("a,b").coerce(ValueType::String), Value::from("a,b"));
    }

    #[test]
    fn test_display_coerces_back() {
        for value in [Value::from(true), Value::from(false), Value::from(-17i64)] {
            let ty = value.value_type();
            assert_eq!(Value::from(value.to_string()).coerce(ty), value);
        }
    }

    #[test]
    fn test_type_names() {
        for ty in ValueType::ALL {
            assert_eq!(ty.name().parse::<ValueType>(), Ok(ty));
        }
        assert_eq!(
            "float".parse::<ValueType>(),
            Err(UnknownValueType("float".to_string()))
        );
        assert!("Integer".parse::<ValueType>().is_err());
    }

    #[test]
    fn test_from_narrow_integer() {
        assert_eq!(Value::from(-7i32), Value::Integer(-7));
        assert_eq!(Value::from(i32::MAX), Value::Integer(2_147_483_647));
    }
}
