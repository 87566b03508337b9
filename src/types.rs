use crate::classify::ComplianceTier;
use chrono::NaiveDateTime;
use serde::Serialize;
use tabled::Tabled;

/// A single spreadsheet cell after loading.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    /// Trimmed textual value, `None` for empty cells.
    ///
    /// Integral numbers render without a fractional part so unit codes typed
    /// as numbers in a workbook (`101`) compare equal to their text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            Cell::Number(n) => Some(render_number(*n)),
            Cell::Date(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Header rendering: like `as_text` but never absent.
    pub fn header_text(&self) -> String {
        self.as_text().unwrap_or_default()
    }
}

fn render_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One sheet of a workbook: the header row plus data rows of equal width.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new(sheet: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, Cell::Empty);
                r
            })
            .collect();
        Dataset {
            sheet: sheet.into(),
            headers,
            rows,
        }
    }
}

/// A header recognised as holding one month of payments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthColumn {
    pub index: usize,
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub total_payment: f64,
    pub paid_months: u32,
    pub active_months: u32,
    pub compliance_pct: f64,
    pub tier: ComplianceTier,
    pub avg_per_paid_month: f64,
}

/// A dataset row with its extracted fields and derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessedRow {
    pub source_index: usize,
    pub unit: Option<String>,
    pub status: Option<String>,
    pub registration: Option<String>,
    pub classification: Option<String>,
    pub monthly: Vec<f64>,
    pub metrics: DerivedMetrics,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TierCountRow {
    #[serde(rename = "Tier")]
    #[tabled(rename = "Tier")]
    pub tier: ComplianceTier,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Units")]
    #[tabled(rename = "Units")]
    pub units: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyTotalRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "TotalPayment")]
    #[tabled(rename = "TotalPayment")]
    pub total_payment: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopPayerRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "TotalPayment")]
    #[tabled(rename = "TotalPayment")]
    pub total_payment: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SummaryRow {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "TMT")]
    #[tabled(rename = "TMT")]
    pub registration: String,
    #[serde(rename = "TotalPayment")]
    #[tabled(rename = "TotalPayment")]
    pub total_payment: String,
    #[serde(rename = "ActiveMonths")]
    #[tabled(rename = "ActiveMonths")]
    pub active_months: u32,
    #[serde(rename = "PaidMonths")]
    #[tabled(rename = "PaidMonths")]
    pub paid_months: u32,
    #[serde(rename = "CompliancePct")]
    #[tabled(rename = "CompliancePct")]
    pub compliance_pct: String,
    #[serde(rename = "Tier")]
    #[tabled(rename = "Tier")]
    pub tier: ComplianceTier,
    #[serde(rename = "AvgPerMonth")]
    #[tabled(rename = "AvgPerMonth")]
    pub avg_per_month: String,
}

#[derive(Debug, Serialize)]
pub struct ComplianceOverview {
    pub sheet: String,
    pub tax_type: String,
    pub fiscal_year: i32,
    pub total_units: usize,
    pub total_payment: f64,
    pub avg_compliance_pct: f64,
    pub compliant: usize,
    pub partially_compliant: usize,
    pub non_compliant: usize,
    pub inactive: usize,
}
