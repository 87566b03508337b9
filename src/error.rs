use thiserror::Error;

/// Failures at the I/O and configuration boundary.
///
/// The assessment core never returns these: malformed cells degrade to
/// defaults instead. Only opening a file, picking a sheet or choosing an
/// invalid configuration can fail.
#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook contains no sheets")]
    NoSheets,

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Sheet {0} has no header row")]
    EmptySheet(String),

    #[error("Fiscal year {0} is outside the supported range 2000-2100")]
    FiscalYearOutOfRange(i32),

    #[error("Unknown tax type: {0}")]
    UnknownTaxType(String),
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
