use std::borrow::Cow;
use std::fmt;

use once_cell::sync::{Lazy, OnceCell};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

// Numeric token: optional "($" prefix, digits with separators, optional
// decimals, optional unit letter for the amount patterns.
const AMOUNT: &str = r"(\(\$?\d[\d,]*(?:\.\d+)?[MBK]?\)|\d[\d,]*(?:\.\d+)?[MBK]?)";
const RATIO: &str = r"(\(\$?\d[\d,]*(?:\.\d+)?\)|\d[\d,]*(?:\.\d+)?)";

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

static INVESTMENT_PATTERNS: OnceCell<Vec<MetricPattern>> = OnceCell::new();
static RISK_PATTERNS: OnceCell<Vec<MetricPattern>> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
  Revenue,
  NetIncome,
  Eps,
  DebtToEquity,
  CurrentRatio,
  Volatility,
}

impl Metric {
  pub fn label(&self) -> &'static str {
    match self {
      Metric::Revenue => "Revenue",
      Metric::NetIncome => "Net Income",
      Metric::Eps => "EPS",
      Metric::DebtToEquity => "Debt-to-Equity",
      Metric::CurrentRatio => "Current Ratio",
      Metric::Volatility => "Volatility",
    }
  }
}

impl fmt::Display for Metric {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Error, Debug)]
pub enum ExtractionError {
  #[error("invalid pattern for {metric}: {source}")]
  InvalidPattern {
    metric: Metric,
    #[source]
    source: regex::Error,
  },
}

/// A labeled, case-insensitive search whose first capture group is the raw value.
#[derive(Debug, Clone)]
pub struct MetricPattern {
  pub metric: Metric,
  regex: Regex,
}

impl MetricPattern {
  pub fn new(metric: Metric, pattern: &str) -> Result<Self, ExtractionError> {
    let regex: Regex = RegexBuilder::new(pattern)
      .case_insensitive(true)
      .build()
      .map_err(|source| ExtractionError::InvalidPattern { metric, source })?;
    Ok(MetricPattern { metric, regex })
  }

  fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
    self.regex.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str())
  }
}

/// Raw values keyed by metric, in the order they were found. First match wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricFindings {
  entries: Vec<(Metric, String)>,
}

impl MetricFindings {
  pub fn new() -> Self {
    MetricFindings { entries: Vec::new() }
  }

  pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (Metric, &'a str)>) -> Self {
    let mut findings: MetricFindings = MetricFindings::new();
    for (metric, raw) in pairs {
      findings.insert(metric, raw);
    }
    findings
  }

  /// Returns false when the metric was already recorded.
  pub fn insert(&mut self, metric: Metric, raw: &str) -> bool {
    if self.contains(metric) {
      return false;
    }
    self.entries.push((metric, raw.to_string()));
    true
  }

  pub fn get(&self, metric: Metric) -> Option<&str> {
    self.entries.iter().find(|(m, _)| *m == metric).map(|(_, raw)| raw.as_str())
  }

  pub fn contains(&self, metric: Metric) -> bool {
    self.entries.iter().any(|(m, _)| *m == metric)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (Metric, &str)> {
    self.entries.iter().map(|(m, raw)| (*m, raw.as_str()))
  }
}

pub fn collapse_whitespace(text: &str) -> Cow<'_, str> {
  WHITESPACE_RUN.replace_all(text, " ")
}

pub fn extract_metrics(text: &str, patterns: &[MetricPattern]) -> MetricFindings {
  let processed: Cow<'_, str> = collapse_whitespace(text);
  let mut findings: MetricFindings = MetricFindings::new();

  for pattern in patterns {
    if let Some(raw) = pattern.find(&processed) {
      findings.insert(pattern.metric, raw);
    }
  }

  return findings;
}

pub fn mentions_volatility(text: &str) -> bool {
  text.to_lowercase().contains("volatility")
}

pub fn investment_patterns() -> Result<&'static [MetricPattern], ExtractionError> {
  INVESTMENT_PATTERNS
    .get_or_try_init(|| -> Result<Vec<MetricPattern>, ExtractionError> {
      Ok(vec![
        MetricPattern::new(Metric::Revenue, &labeled(r"Revenue", AMOUNT))?,
        MetricPattern::new(Metric::NetIncome, &labeled(r"Net\s+Income", AMOUNT))?,
        MetricPattern::new(Metric::Eps, &labeled(r"EPS", RATIO))?,
        MetricPattern::new(Metric::DebtToEquity, &labeled(DEBT_TO_EQUITY, RATIO))?,
      ])
    })
    .map(Vec::as_slice)
}

pub fn risk_patterns() -> Result<&'static [MetricPattern], ExtractionError> {
  RISK_PATTERNS
    .get_or_try_init(|| -> Result<Vec<MetricPattern>, ExtractionError> {
      Ok(vec![
        MetricPattern::new(Metric::CurrentRatio, &labeled(r"Current\s+Ratio", RATIO))?,
        MetricPattern::new(Metric::DebtToEquity, &labeled(DEBT_TO_EQUITY, RATIO))?,
      ])
    })
    .map(Vec::as_slice)
}

pub fn extract_investment_findings(text: &str) -> Result<MetricFindings, ExtractionError> {
  Ok(extract_metrics(text, investment_patterns()?))
}

pub fn extract_risk_findings(text: &str) -> Result<MetricFindings, ExtractionError> {
  let mut findings: MetricFindings = extract_metrics(text, risk_patterns()?);
  if mentions_volatility(text) {
    findings.insert(Metric::Volatility, "Mentioned");
  }
  Ok(findings)
}

// Debt-to-Equity, Debt to Equity, Debt/Equity, DebtEquity, with an optional "Ratio".
const DEBT_TO_EQUITY: &str = r"Debt[\s/-]*(?:to[\s-]*)?Equity(?:\s+Ratio)?";

fn labeled(label: &str, value: &str) -> String {
  format!(r"\b{}[:\s]+\$?{}", label, value)
}
