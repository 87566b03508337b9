use chrono::NaiveDate;
use proptest::prelude::*;
use tax_compliance::pipeline::derive_metrics;
use tax_compliance::{active_months, classify, ComplianceTier};

proptest! {
    #[test]
    fn earlier_years_are_fully_active(year in 2000i32..2100, month in 1u32..=12, gap in 1i32..50) {
        let date = NaiveDate::from_ymd_opt(year - gap, month, 1);
        prop_assert_eq!(active_months(date, year), 12);
    }

    #[test]
    fn same_year_counts_to_december(year in 2000i32..=2100, month in 1u32..=12, day in 1u32..=28) {
        let date = NaiveDate::from_ymd_opt(year, month, day);
        prop_assert_eq!(active_months(date, year), 13 - month);
    }

    #[test]
    fn no_active_months_is_inactive(paid in 0u32..=24) {
        prop_assert_eq!(classify(0, paid), ComplianceTier::Inactive);
    }

    #[test]
    fn paying_every_active_month_is_compliant(active in 1u32..=12, extra in 0u32..=12) {
        prop_assert_eq!(classify(active, active + extra), ComplianceTier::Compliant);
    }

    #[test]
    fn metrics_stay_in_range(
        amounts in proptest::collection::vec(-100.0f64..1000.0, 0..14),
        active in 0u32..=12,
    ) {
        let m = derive_metrics(&amounts, active);
        prop_assert!(m.paid_months as usize <= amounts.len());
        prop_assert!(!m.compliance_pct.is_nan());
        if active == 0 {
            prop_assert_eq!(m.compliance_pct, 0.0);
        }
        if m.paid_months <= active {
            prop_assert!((0.0..=100.0).contains(&m.compliance_pct));
        }
        prop_assert_eq!(m.tier, classify(active, m.paid_months));
    }

    #[test]
    fn paying_beyond_active_months_exceeds_full(active in 1u32..12) {
        let m = derive_metrics(&[1.0; 12], active);
        prop_assert!(m.compliance_pct > 100.0);
        prop_assert_eq!(m.compliance_pct, 1200.0 / active as f64);
        prop_assert_eq!(m.tier, ComplianceTier::Compliant);
    }
}
