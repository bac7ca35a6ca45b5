//! Engineering-notation value matching.
//!
//! `0.1uF`, `100n` and `100nF` normalize to the same magnitude; `4R7`,
//! `4.7ohm` and `4.7` likewise. Text that does not parse is kept verbatim.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fractional digits in a normalized magnitude.
const MAGNITUDE_DIGITS: u32 = 15;

/// Prefix spellings with their power of ten, in match priority order.
const PREFIXES: [(&str, i32); 16] = [
    ("pico", -12),
    ("p", -12),
    ("nano", -9),
    ("n", -9),
    ("\u{03bc}", -6),
    ("\u{00b5}", -6),
    ("u", -6),
    ("micro", -6),
    ("milli", -3),
    ("m", -3),
    ("kilo", 3),
    ("k", 3),
    ("mega", 6),
    ("meg", 6),
    ("giga", 9),
    ("g", 9),
];

const UNITS: [(&str, Unit); 9] = [
    ("r", Unit::Ohm),
    ("ohms", Unit::Ohm),
    ("ohm", Unit::Ohm),
    ("\u{03a9}", Unit::Ohm),
    ("\u{03c9}", Unit::Ohm),
    ("farad", Unit::Farad),
    ("f", Unit::Farad),
    ("henry", Unit::Henry),
    ("h", Unit::Henry),
];

static VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    let prefixes = PREFIXES
        .iter()
        .map(|(p, _)| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    let units = UNITS
        .iter()
        .map(|(u, _)| regex::escape(u))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"^([0-9.]+)({prefixes})*({units})*(\d*)$"))
        .expect("value regex is valid")
});

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(r|rv|c|l)\d+$").expect("reference regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "R")]
    Ohm,
    #[serde(rename = "F")]
    Farad,
    #[serde(rename = "H")]
    Henry,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Unit::Ohm => "R",
            Unit::Farad => "F",
            Unit::Henry => "H",
        };
        write!(f, "{symbol}")
    }
}

impl Unit {
    fn from_token(token: &str) -> Option<Self> {
        UNITS.iter().find(|(u, _)| *u == token).map(|(_, unit)| *unit)
    }

    /// Unit implied by a reference designator such as `R5`, `RV1`, `C3`, `L2`.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let lowered = reference.to_lowercase();
        let caps = REFERENCE_RE.captures(&lowered)?;
        match caps.get(1)?.as_str() {
            "r" | "rv" => Some(Unit::Ohm),
            "c" => Some(Unit::Farad),
            "l" => Some(Unit::Henry),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalSeparator {
    /// `,` is a thousands separator and is dropped.
    #[default]
    Dot,
    /// `,` is the decimal separator.
    Comma,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub decimal_separator: DecimalSeparator,
}

/// Canonical `(magnitude, unit)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedValue {
    /// Base-unit magnitude with exactly 15 fractional digits.
    pub magnitude: String,
    pub unit: Option<Unit>,
}

impl NormalizedValue {
    /// Same magnitude, and units agree or at least one side has none.
    pub fn matches(&self, other: &NormalizedValue) -> bool {
        self.magnitude == other.magnitude && units_compatible(self.unit, other.unit)
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(f, "{} {unit}", self.magnitude),
            None => write!(f, "{}", self.magnitude),
        }
    }
}

pub fn units_compatible(a: Option<Unit>, b: Option<Unit>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Value as used for grouping: normalized when possible, else the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentValue {
    Normalized(NormalizedValue),
    Literal(String),
}

impl ComponentValue {
    pub fn unit(&self) -> Option<Unit> {
        match self {
            ComponentValue::Normalized(v) => v.unit,
            ComponentValue::Literal(_) => None,
        }
    }

    /// Grouping key without the unit, which is compared separately.
    pub fn key(&self) -> &str {
        match self {
            ComponentValue::Normalized(v) => &v.magnitude,
            ComponentValue::Literal(text) => text,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, ComponentValue::Literal(_))
    }
}

fn pow10(exp: i32) -> Decimal {
    if exp >= 0 {
        Decimal::from_i128_with_scale(10i128.pow(exp as u32), 0)
    } else {
        Decimal::new(1, (-exp) as u32)
    }
}

fn parse_decimal(number: &str) -> Option<Decimal> {
    if number.matches('.').count() > 1 || !number.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut text = String::with_capacity(number.len() + 2);
    if number.starts_with('.') {
        text.push('0');
    }
    text.push_str(number);
    if number.ends_with('.') {
        text.push('0');
    }
    Decimal::from_str(&text).ok()
}

/// Fallback for magnitudes outside `Decimal`'s range.
fn format_float(number: &str, exp: i32) -> Option<String> {
    let value = number.parse::<f64>().ok()? * 10f64.powi(exp);
    value
        .is_finite()
        .then(|| format!("{value:.prec$}", prec = MAGNITUDE_DIGITS as usize))
}

fn format_magnitude(number: &str, exp: i32) -> Option<String> {
    let scaled = parse_decimal(number).and_then(|d| d.checked_mul(pow10(exp)));
    match scaled {
        Some(d) => {
            let mut d = d.round_dp(MAGNITUDE_DIGITS);
            d.rescale(MAGNITUDE_DIGITS);
            Some(d.to_string())
        }
        None => format_float(number, exp),
    }
}

/// Parse free-form value text into a canonical magnitude and unit.
///
/// `None` when the text is not in engineering notation.
pub fn normalize(text: &str, config: &NormalizerConfig) -> Option<NormalizedValue> {
    let lowered = text.trim().to_lowercase();
    let cleaned = match config.decimal_separator {
        DecimalSeparator::Comma => lowered.replace(',', "."),
        DecimalSeparator::Dot => lowered.replace(',', ""),
    };

    let caps = VALUE_RE.captures(&cleaned)?;
    let value = caps.get(1).map_or("", |m| m.as_str());
    let prefix = caps.get(2).map(|m| m.as_str());
    let unit = caps.get(3).and_then(|m| Unit::from_token(m.as_str()));
    let post = caps.get(4).map_or("", |m| m.as_str());

    // "4k7" and "0R1": the prefix or unit stands in for the decimal point.
    let number = if !post.is_empty() && !value.contains('.') {
        format!("{value}.{post}")
    } else {
        value.to_string()
    };

    let exp = prefix
        .and_then(|p| PREFIXES.iter().find(|(name, _)| *name == p))
        .map_or(0, |(_, exp)| *exp);

    Some(NormalizedValue {
        magnitude: format_magnitude(&number, exp)?,
        unit,
    })
}

/// Normalize a component's value, inferring a missing unit from its
/// reference designator. Unparseable text is returned as a literal.
pub fn component_value(text: &str, reference: &str, config: &NormalizerConfig) -> ComponentValue {
    match normalize(text, config) {
        Some(mut value) => {
            if value.unit.is_none() {
                value.unit = Unit::from_reference(reference);
            }
            ComponentValue::Normalized(value)
        }
        None => ComponentValue::Literal(text.to_string()),
    }
}

/// Whether two value strings denote the same quantity.
pub fn compare_values(a: &str, b: &str, config: &NormalizerConfig) -> bool {
    match (normalize(a, config), normalize(b, config)) {
        (Some(a), Some(b)) => a.matches(&b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn norm(text: &str) -> Option<NormalizedValue> {
        normalize(text, &NormalizerConfig::default())
    }

    fn magnitude(text: &str) -> String {
        norm(text).unwrap().magnitude
    }

    #[test]
    fn test_prefixes_scale_to_base_unit() {
        assert_eq!(magnitude("4.7k"), "4700.000000000000000");
        assert_eq!(magnitude("4700"), "4700.000000000000000");
        assert_eq!(magnitude("100n"), "0.000000100000000");
        assert_eq!(magnitude("0.1uF"), "0.000000100000000");
        assert_eq!(magnitude("0.1\u{00b5}F"), "0.000000100000000");
        assert_eq!(magnitude("0.1\u{03bc}F"), "0.000000100000000");
        assert_eq!(magnitude("2.2MEG"), "2200000.000000000000000");
        assert_eq!(magnitude("3.3mOhm"), "0.003300000000000");
        assert_eq!(magnitude("1p"), "0.000000000001000");
    }

    #[test]
    fn test_unit_replaces_decimal_point() {
        let v = norm("0R1").unwrap();
        assert_eq!(v.magnitude, "0.100000000000000");
        assert_eq!(v.unit, Some(Unit::Ohm));
        assert_eq!(norm("0R1"), norm("0.1R"));
        assert_eq!(magnitude("4k7"), "4700.000000000000000");
        assert_eq!(magnitude("0R05"), "0.050000000000000");
        // A literal decimal point wins over the trailing digits.
        assert_eq!(magnitude("1.5k2"), "1500.000000000000000");
    }

    #[test]
    fn test_units() {
        assert_eq!(norm("10\u{2126}").unwrap().unit, Some(Unit::Ohm));
        assert_eq!(norm("10ohms").unwrap().unit, Some(Unit::Ohm));
        assert_eq!(norm("10uH").unwrap().unit, Some(Unit::Henry));
        assert_eq!(norm("10 farad"), None);
        assert_eq!(norm("22pF").unwrap().unit, Some(Unit::Farad));
        assert_eq!(norm("4.7k").unwrap().unit, None);
    }

    #[test]
    fn test_unparseable_text() {
        assert_eq!(norm("DNP"), None);
        assert_eq!(norm(""), None);
        assert_eq!(norm("1.2.3"), None);
        assert_eq!(norm("."), None);
        assert_eq!(
            component_value("STM32F103", "U1", &NormalizerConfig::default()),
            ComponentValue::Literal("STM32F103".to_string())
        );
    }

    #[test]
    fn test_separators() {
        assert_eq!(magnitude("1,000"), "1000.000000000000000");
        let comma = NormalizerConfig {
            decimal_separator: DecimalSeparator::Comma,
        };
        assert_eq!(
            normalize("4,7k", &comma).unwrap().magnitude,
            "4700.000000000000000"
        );
    }

    #[test]
    fn test_unit_inferred_from_reference() {
        let config = NormalizerConfig::default();
        assert_eq!(component_value("10k", "R3", &config).unit(), Some(Unit::Ohm));
        assert_eq!(component_value("10k", "RV1", &config).unit(), Some(Unit::Ohm));
        assert_eq!(component_value("100n", "c7", &config).unit(), Some(Unit::Farad));
        assert_eq!(component_value("10u", "L1", &config).unit(), Some(Unit::Henry));
        assert_eq!(component_value("10k", "U1", &config).unit(), None);
        assert_eq!(component_value("10k", "R", &config).unit(), None);
        // An explicit unit is never overridden.
        assert_eq!(component_value("10uH", "C1", &config).unit(), Some(Unit::Henry));
    }

    #[test]
    fn test_relaxed_unit_equality() {
        let config = NormalizerConfig::default();
        assert!(compare_values("4.7k", "4700", &config));
        assert!(compare_values("4.7k", "4k7ohm", &config));
        // A unit-less value matches any unit, even when the two sides
        // disagree with each other.
        assert!(compare_values("1", "1F", &config));
        assert!(compare_values("1", "1R", &config));
        assert!(!compare_values("1F", "1R", &config));
        assert!(!compare_values("1k", "1M", &config));
        assert!(!compare_values("abc", "abc", &config));
    }

    #[test]
    fn test_prefix_scale() {
        assert_eq!(pow10(3), dec!(1000));
        assert_eq!(pow10(-12), dec!(0.000000000001));
        assert_eq!(parse_decimal(".5"), Some(dec!(0.5)));
        assert_eq!(parse_decimal("5."), Some(dec!(5)));
    }

    #[test]
    fn test_huge_values_fall_back_to_float() {
        let digits = "9".repeat(30);
        let v = norm(&digits).unwrap();
        assert!(v.magnitude.ends_with(".000000000000000"));
    }
}
