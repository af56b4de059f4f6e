use once_cell::sync::Lazy;
use regex::Regex;

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

static PLAIN_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

/// Converts financial strings like `25.0B`, `($500M)` or `1,200,000` into floats.
///
/// B = billion, M = million, K = thousand. A value wrapped in parentheses is
/// negative. Anything that does not fit that shape yields `None`, so a bad
/// figure only drops the rule that needed it.
pub fn normalize_number(raw: &str) -> Option<f64> {
  let cleaned: String = raw.chars().filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c)).collect();
  let mut value: &str = cleaned.trim();
  let mut sign: f64 = 1.0;

  if value.len() >= 2 && value.starts_with('(') && value.ends_with(')') {
    sign = -1.0;
    value = &value[1..value.len() - 1];
  }

  let (digits, multiplier) = split_unit(value);
  let parsed: f64 = parse_plain_decimal(digits)?;

  Some(parsed * multiplier * sign)
}

fn split_unit(value: &str) -> (&str, f64) {
  let multiplier: f64 = match value.chars().last().map(|c| c.to_ascii_uppercase()) {
    Some('B') => 1_000_000_000.0,
    Some('M') => 1_000_000.0,
    Some('K') => 1_000.0,
    _ => return (value, 1.0),
  };
  // unit letters are ASCII, so the slice stays on a char boundary
  (&value[..value.len() - 1], multiplier)
}

// f64::from_str also accepts "inf", "1e5" and signs; only bare decimals count here.
fn parse_plain_decimal(digits: &str) -> Option<f64> {
  if !PLAIN_DECIMAL.is_match(digits) {
    return None;
  }
  digits.parse::<f64>().ok()
}
