use std::fmt;

use crate::ai_agent::data::metrics::{extract_investment_findings, extract_risk_findings, ExtractionError, Metric, MetricFindings};
use crate::ai_agent::data::normalize::normalize_number;

pub const INVESTMENT_HEADER: &str = "📊 **Investment Analysis Report**\n";
pub const RISK_HEADER: &str = "⚠️ **Risk Assessment Report**\n";

const NO_INVESTMENT_METRICS: &str = "No key metrics could be extracted from the document.\n";
const NO_RISK_METRICS: &str = "No specific risk metrics could be extracted.\n";

/// Narrative report text, consumed as-is by the agents and the end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report(String);

impl Report {
  fn new(header: &str) -> Self {
    Report(header.to_string())
  }

  fn line(&mut self, line: &str) {
    self.0.push_str(line);
    self.0.push('\n');
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

fn normalized(findings: &MetricFindings, metric: Metric) -> Option<f64> {
  findings.get(metric).and_then(normalize_number)
}

fn list_findings(report: &mut Report, findings: &MetricFindings) {
  for (metric, raw) in findings.iter() {
    report.line(&format!("- {}: {}", metric.label(), raw));
  }
}

pub fn build_investment_report(findings: &MetricFindings) -> Report {
  let mut report: Report = Report::new(INVESTMENT_HEADER);
  if findings.is_empty() {
    report.0.push_str(NO_INVESTMENT_METRICS);
    return report;
  }

  list_findings(&mut report, findings);

  if let Some(d2e) = normalized(findings, Metric::DebtToEquity) {
    if d2e < 1.0 {
      report.line("✅ Healthy leverage (low debt-to-equity ratio).");
    } else {
      report.line("⚠️ High leverage risk (high debt-to-equity ratio).");
    }
  }

  let net_income: Option<f64> = normalized(findings, Metric::NetIncome);
  let revenue: Option<f64> = normalized(findings, Metric::Revenue);
  if let (Some(ni), Some(rev)) = (net_income, revenue) {
    if rev > 0.0 {
      let margin: f64 = (ni / rev) * 100.0;
      report.line(&format!("- Profit Margin: {:.2}%", margin));
      if margin > 10.0 {
        report.line("✅ Strong profitability.");
      } else {
        report.line("⚠️ Weak profitability.");
      }
    }
  }

  return report;
}

pub fn build_risk_report(findings: &MetricFindings) -> Report {
  let mut report: Report = Report::new(RISK_HEADER);
  if findings.is_empty() {
    report.0.push_str(NO_RISK_METRICS);
    return report;
  }

  list_findings(&mut report, findings);

  if let Some(cr) = normalized(findings, Metric::CurrentRatio) {
    if cr < 1.0 {
      report.line("❌ Liquidity Risk: Current ratio below 1.");
    } else if cr < 2.0 {
      report.line("⚠️ Moderate liquidity risk.");
    } else {
      report.line("✅ Good liquidity position.");
    }
  }

  if let Some(d2e) = normalized(findings, Metric::DebtToEquity) {
    if d2e > 2.0 {
      report.line("❌ High leverage risk.");
    } else if d2e > 1.0 {
      report.line("⚠️ Moderate leverage risk.");
    } else {
      report.line("✅ Acceptable leverage level.");
    }
  }

  if findings.contains(Metric::Volatility) {
    report.line("⚠️ Market volatility mentioned — potential risk exposure.");
  }

  return report;
}

pub fn analyze_investment(financial_document_data: &str) -> Result<Report, ExtractionError> {
  let findings: MetricFindings = extract_investment_findings(financial_document_data)?;
  Ok(build_investment_report(&findings))
}

pub fn assess_risk(financial_document_data: &str) -> Result<Report, ExtractionError> {
  let findings: MetricFindings = extract_risk_findings(financial_document_data)?;
  Ok(build_risk_report(&findings))
}
