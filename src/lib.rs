//! Tax-payment compliance metrics for administrative units.
//!
//! A workbook sheet of monthly payment records is loaded into a
//! [`Dataset`](types::Dataset), its headers are normalized, the monthly
//! payment columns are detected, and every row gets derived metrics:
//! total payment, paid and active months, compliance percentage and a
//! [`ComplianceTier`](classify::ComplianceTier). Filters and reports then
//! work on the assessed rows without touching the metrics.
//!
//! ```rust,ignore
//! use tax_compliance::{assess, loader, AssessmentConfig, TaxType};
//!
//! let (dataset, _) = loader::load_sheet("setoran.xlsx".as_ref(), None)?;
//! let config = AssessmentConfig::new(TaxType::Entertainment, 2024)?;
//! let assessment = assess(&dataset, &config);
//! ```
pub mod active;
pub mod classify;
pub mod error;
pub mod filter;
pub mod loader;
pub mod months;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod types;
pub mod util;

pub use active::active_months;
pub use classify::{classify, ComplianceTier};
pub use error::{ComplianceError, Result};
pub use filter::{FilterOptions, FilterSelection};
pub use months::detect_month_columns;
pub use normalize::normalize_column;
pub use pipeline::{assess, Assessment, AssessmentConfig, TaxType};
pub use types::{AssessedRow, Cell, Dataset, DerivedMetrics};
