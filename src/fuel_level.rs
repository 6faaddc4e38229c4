use std::fmt;
use std::sync::OnceLock;

use num_traits::ToPrimitive;
use regex::Regex;
use serde_json::Number;

/// The `levelBsa` property exactly as the feed delivered it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawLevel {
    #[default]
    Missing,
    Number(Number),
    Text(String),
}

impl RawLevel {
    /// Parses the raw value into a numeric level. Numbers and strings both go through
    /// their text form so a level of `20000` and `"20000"` classify the same way.
    pub fn fuel_level(&self) -> Option<FuelLevel> {
        match self {
            RawLevel::Missing => None,
            RawLevel::Number(number) => FuelLevel::parse(&number.to_string()),
            RawLevel::Text(text) => FuelLevel::parse(text),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawLevel::Missing)
    }
}

impl fmt::Display for RawLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RawLevel::Missing => write!(f, "N/A"),
            RawLevel::Number(number) => write!(f, "{}", number),
            RawLevel::Text(text) => f.write_str(text),
        }
    }
}

/// A fuel level in liters, kept in the narrowest representation that parsed it.
#[derive(Debug, Clone, PartialEq)]
pub enum FuelLevel {
    Integer(i32),
    Long(i64),
    Float(f64),
    /// A decimal literal too large for `f64`, kept verbatim.
    Decimal(String),
}

fn decimal_literal() -> &'static Regex {
    static DECIMAL: OnceLock<Regex> = OnceLock::new();
    DECIMAL.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$")
            .expect("decimal literal pattern is valid")
    })
}

impl FuelLevel {
    /// Tries integer, then long, then float, then arbitrary precision decimal.
    /// Returns `None` when the text is not a number at all.
    pub fn parse(raw: &str) -> Option<FuelLevel> {
        if let Ok(value) = raw.parse::<i32>() {
            return Some(FuelLevel::Integer(value));
        }

        if let Ok(value) = raw.parse::<i64>() {
            return Some(FuelLevel::Long(value));
        }

        // f64 parsing also accepts "inf" and "NaN", which are not levels, and
        // overflows huge literals to infinity, which the decimal stage handles.
        // Rejecting "Infinity" makes it unavailable, so it classifies as Critical.
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => return Some(FuelLevel::Float(value)),
            _ => {}
        }

        if decimal_literal().is_match(raw) {
            return Some(FuelLevel::Decimal(raw.to_string()));
        }

        None
    }

    /// Liters as a float. Decimals beyond the `f64` range saturate to an infinity of the
    /// right sign, which still compares correctly against the tier thresholds.
    pub fn liters(&self) -> f64 {
        match self {
            FuelLevel::Integer(value) => *value as f64,
            FuelLevel::Long(value) => *value as f64,
            FuelLevel::Float(value) => *value,
            FuelLevel::Decimal(raw) => {
                let negative = raw.starts_with('-');
                raw.parse::<f64>().unwrap_or(if negative {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                })
            }
        }
    }
}

impl ToPrimitive for FuelLevel {
    fn to_i64(&self) -> Option<i64> {
        match self {
            FuelLevel::Integer(value) => Some(*value as i64),
            FuelLevel::Long(value) => Some(*value),
            _ => self.liters().to_i64(),
        }
    }

    fn to_u64(&self) -> Option<u64> {
        match self {
            FuelLevel::Integer(value) => value.to_u64(),
            FuelLevel::Long(value) => value.to_u64(),
            _ => self.liters().to_u64(),
        }
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.liters())
    }
}

impl fmt::Display for FuelLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FuelLevel::Integer(value) => write!(f, "{}", value),
            FuelLevel::Long(value) => write!(f, "{}", value),
            FuelLevel::Float(value) => write!(f, "{}", value),
            FuelLevel::Decimal(raw) => f.write_str(raw),
        }
    }
}
