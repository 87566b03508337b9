// Per-row compliance metrics over a loaded dataset.
use crate::active::{active_months, registration_date};
use crate::classify::classify;
use crate::error::{ComplianceError, Result};
use crate::months::detect_month_columns;
use crate::normalize::{find_column, normalize_columns, CLASSIFICATION, REGISTRATION, STATUS, UNIT};
use crate::types::{AssessedRow, Cell, Dataset, DerivedMetrics, MonthColumn};
use crate::util::parse_f64_safe;
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::{debug, info};

pub const FISCAL_YEAR_RANGE: RangeInclusive<i32> = 2000..=2100;
pub const DEFAULT_FISCAL_YEAR: i32 = 2024;

/// Regional tax the workbook reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TaxType {
    /// Restaurant tax ("MAKAN MINUM").
    #[default]
    FoodBeverage,
    /// Entertainment tax ("HIBURAN"); the only one with a classification.
    Entertainment,
}

impl TaxType {
    pub fn uses_classification(self) -> bool {
        matches!(self, TaxType::Entertainment)
    }

    pub fn local_label(self) -> &'static str {
        match self {
            TaxType::FoodBeverage => "MAKAN MINUM",
            TaxType::Entertainment => "HIBURAN",
        }
    }
}

impl fmt::Display for TaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxType::FoodBeverage => f.write_str("food & beverage"),
            TaxType::Entertainment => f.write_str("entertainment"),
        }
    }
}

impl FromStr for TaxType {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "makan minum" | "food & beverage" | "food-beverage" | "food" => Ok(TaxType::FoodBeverage),
            "hiburan" | "entertainment" => Ok(TaxType::Entertainment),
            _ => Err(ComplianceError::UnknownTaxType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssessmentConfig {
    pub tax_type: TaxType,
    pub fiscal_year: i32,
}

impl AssessmentConfig {
    pub fn new(tax_type: TaxType, fiscal_year: i32) -> Result<Self> {
        if !FISCAL_YEAR_RANGE.contains(&fiscal_year) {
            return Err(ComplianceError::FiscalYearOutOfRange(fiscal_year));
        }
        Ok(AssessmentConfig {
            tax_type,
            fiscal_year,
        })
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        AssessmentConfig {
            tax_type: TaxType::default(),
            fiscal_year: DEFAULT_FISCAL_YEAR,
        }
    }
}

/// Result of one assessment pass: the normalized schema plus one
/// `AssessedRow` per dataset row, in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub sheet: String,
    pub config: AssessmentConfig,
    pub columns: Vec<String>,
    pub month_columns: Vec<MonthColumn>,
    pub has_classification: bool,
    pub rows: Vec<AssessedRow>,
}

/// Column positions resolved once per assessment.
struct FieldColumns {
    unit: Option<usize>,
    status: Option<usize>,
    registration: Option<usize>,
    classification: Option<usize>,
}

/// Numeric value of a payment cell; anything non-numeric counts as 0.
pub fn coerce_amount(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Text(s) => parse_f64_safe(Some(s)).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Derive the metrics of one unit from its monthly amounts and active months.
pub fn derive_metrics(monthly: &[f64], active_months: u32) -> DerivedMetrics {
    let total_payment: f64 = monthly.iter().sum();
    let paid_months = monthly.iter().filter(|v| **v > 0.0).count() as u32;
    let compliance_pct = if active_months > 0 {
        paid_months as f64 / active_months as f64 * 100.0
    } else {
        0.0
    };
    let avg_per_paid_month = if paid_months > 0 {
        total_payment / paid_months as f64
    } else {
        0.0
    };
    DerivedMetrics {
        total_payment,
        paid_months,
        active_months,
        compliance_pct,
        tier: classify(active_months, paid_months),
        avg_per_paid_month,
    }
}

/// Run the assessment over every row of `dataset`.
///
/// The dataset is only read. Running this twice with the same inputs gives
/// identical rows.
pub fn assess(dataset: &Dataset, config: &AssessmentConfig) -> Assessment {
    let columns = normalize_columns(&dataset.headers);
    // Detection runs on the normalized schema; reports keep the header as typed.
    let month_columns: Vec<MonthColumn> = detect_month_columns(&columns)
        .into_iter()
        .map(|m| MonthColumn {
            header: dataset.headers[m.index].clone(),
            ..m
        })
        .collect();
    let fields = FieldColumns {
        unit: find_column(&columns, UNIT),
        status: find_column(&columns, STATUS),
        registration: find_column(&columns, REGISTRATION),
        classification: find_column(&columns, CLASSIFICATION),
    };
    debug!(
        months = ?month_columns.iter().map(|m| m.header.as_str()).collect::<Vec<_>>(),
        "detected month columns"
    );
    if fields.registration.is_none() {
        debug!("no registration date column; every unit will be inactive");
    }

    let rows: Vec<AssessedRow> = dataset
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| assess_row(i, row, &fields, &month_columns, config.fiscal_year))
        .collect();

    info!(
        sheet = %dataset.sheet,
        rows = rows.len(),
        month_columns = month_columns.len(),
        tax_type = %config.tax_type,
        fiscal_year = config.fiscal_year,
        "assessment complete"
    );

    Assessment {
        sheet: dataset.sheet.clone(),
        config: *config,
        has_classification: fields.classification.is_some(),
        columns,
        month_columns,
        rows,
    }
}

fn assess_row(
    source_index: usize,
    row: &[Cell],
    fields: &FieldColumns,
    month_columns: &[MonthColumn],
    fiscal_year: i32,
) -> AssessedRow {
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));
    let text = |idx: Option<usize>| cell(idx).and_then(Cell::as_text);

    let monthly: Vec<f64> = month_columns
        .iter()
        .map(|m| row.get(m.index).map(coerce_amount).unwrap_or(0.0))
        .collect();
    let registered = cell(fields.registration).and_then(registration_date);
    let metrics = derive_metrics(&monthly, active_months(registered, fiscal_year));

    AssessedRow {
        source_index,
        unit: text(fields.unit),
        status: text(fields.status),
        registration: registered
            .map(|d| d.format("%Y-%m-%d").to_string())
            .or_else(|| text(fields.registration)),
        classification: text(fields.classification),
        monthly,
        metrics,
    }
}
