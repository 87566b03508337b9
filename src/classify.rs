use serde::Serialize;
use std::fmt;

/// Compliance judgment from active vs. paid month counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ComplianceTier {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
    Inactive,
}

/// Largest number of unpaid active months still counted as partial compliance.
pub const PARTIAL_GAP_LIMIT: u32 = 3;

impl ComplianceTier {
    pub const ALL: [ComplianceTier; 4] = [
        ComplianceTier::Compliant,
        ComplianceTier::PartiallyCompliant,
        ComplianceTier::NonCompliant,
        ComplianceTier::Inactive,
    ];

    /// Label used on the tax office's own reports.
    pub fn local_label(self) -> &'static str {
        match self {
            ComplianceTier::Compliant => "Patuh",
            ComplianceTier::PartiallyCompliant => "Kurang Patuh",
            ComplianceTier::NonCompliant => "Tidak Patuh",
            ComplianceTier::Inactive => "Tidak Aktif",
        }
    }
}

impl fmt::Display for ComplianceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComplianceTier::Compliant => "Compliant",
            ComplianceTier::PartiallyCompliant => "Partially Compliant",
            ComplianceTier::NonCompliant => "Non-Compliant",
            ComplianceTier::Inactive => "Inactive",
        };
        f.write_str(s)
    }
}

/// Tier for a unit with `active_months` liable months and `paid_months` paid.
///
/// No active months is always `Inactive`. Otherwise the tier depends on the
/// gap of unpaid active months: none (or overpaid) is compliant, up to
/// `PARTIAL_GAP_LIMIT` is partial, more is non-compliant.
pub fn classify(active_months: u32, paid_months: u32) -> ComplianceTier {
    if active_months == 0 {
        return ComplianceTier::Inactive;
    }
    match active_months.saturating_sub(paid_months) {
        0 => ComplianceTier::Compliant,
        gap if gap <= PARTIAL_GAP_LIMIT => ComplianceTier::PartiallyCompliant,
        _ => ComplianceTier::NonCompliant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_overrides_everything() {
        assert_eq!(classify(0, 0), ComplianceTier::Inactive);
        assert_eq!(classify(0, 12), ComplianceTier::Inactive);
    }

    #[test]
    fn gap_boundaries() {
        assert_eq!(classify(10, 10), ComplianceTier::Compliant);
        assert_eq!(classify(10, 12), ComplianceTier::Compliant);
        assert_eq!(classify(10, 9), ComplianceTier::PartiallyCompliant);
        assert_eq!(classify(10, 8), ComplianceTier::PartiallyCompliant);
        assert_eq!(classify(10, 7), ComplianceTier::PartiallyCompliant);
        assert_eq!(classify(10, 6), ComplianceTier::NonCompliant);
        assert_eq!(classify(10, 5), ComplianceTier::NonCompliant);
    }

    #[test]
    fn labels() {
        assert_eq!(ComplianceTier::PartiallyCompliant.to_string(), "Partially Compliant");
        assert_eq!(ComplianceTier::Inactive.local_label(), "Tidak Aktif");
    }
}
