use std::fmt;

/// Guest value passed across the dispatch layer.
///
/// Only the primitive shapes the window surface needs are modelled; objects and
/// functions stay on the bridge side.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Guest `String(value)`.
    pub fn as_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".into(),
            Self::Null => "null".into(),
            Self::Bool(v) => {
                if *v {
                    "true".into()
                } else {
                    "false".into()
                }
            }
            Self::Number(v) => v.to_string(),
            Self::Float(v) => format_number_default(*v),
            Self::String(v) => v.clone(),
        }
    }

    /// Guest `Number(value)`.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Undefined => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Number(v) => *v as f64,
            Self::Float(v) => *v,
            Self::String(v) => parse_number_literal(v),
        }
    }

    /// IDL `unsigned long` conversion: truncate, then wrap modulo 2^32.
    pub(crate) fn as_u32_wrapping(&self) -> u32 {
        let number = self.as_number();
        if !number.is_finite() {
            return 0;
        }
        let truncated = number.trunc();
        truncated.rem_euclid(4_294_967_296.0) as u32
    }

    /// Integer conversion for delays and timer ids; non-finite numbers become 0.
    pub(crate) fn as_integer(&self) -> i64 {
        let number = self.as_number();
        if !number.is_finite() {
            return 0;
        }
        number.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

pub(crate) fn format_number_default(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == f64::INFINITY {
        return "Infinity".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-Infinity".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if !(1e-6..1e21).contains(&abs) {
        return normalize_exponential_string(format!("{value:e}"));
    }

    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        let integer = value as i64;
        if (integer as f64) == value {
            return integer.to_string();
        }
    }

    format!("{value}")
}

fn normalize_exponential_string(raw: String) -> String {
    let Some(exp_idx) = raw.find('e') else {
        return raw;
    };
    let mantissa = &raw[..exp_idx];
    let exponent = raw[exp_idx + 1..].parse::<i32>().unwrap_or(0);
    format!("{mantissa}e{exponent:+}")
}

fn parse_number_literal(src: &str) -> f64 {
    let trimmed = src.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if unsigned == "Infinity" {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    if trimmed.len() > 2 && (trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
        return parse_radix_digits(&trimmed[2..], 16);
    }
    if trimmed.len() > 2 && (trimmed.starts_with("0o") || trimmed.starts_with("0O")) {
        return parse_radix_digits(&trimmed[2..], 8);
    }
    if trimmed.len() > 2 && (trimmed.starts_with("0b") || trimmed.starts_with("0B")) {
        return parse_radix_digits(&trimmed[2..], 2);
    }

    // Rust accepts "inf" / "nan" spellings the guest grammar does not.
    let is_decimal_literal = unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !is_decimal_literal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix_digits(src: &str, radix: u32) -> f64 {
    if src.is_empty() {
        return f64::NAN;
    }
    let mut out = 0.0f64;
    for ch in src.chars() {
        let Some(digit) = ch.to_digit(radix) else {
            return f64::NAN;
        };
        out = out * (radix as f64) + (digit as f64);
    }
    out
}
