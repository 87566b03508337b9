use crate::classify::ComplianceTier;
use crate::pipeline::Assessment;
use crate::types::{
    AssessedRow, ComplianceOverview, MonthlyTotalRow, SummaryRow, TierCountRow, TopPayerRow,
};
use crate::util::format_number;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const TOP_PAYERS: usize = 5;

/// Units per compliance tier, one row per tier in fixed order.
pub fn tier_histogram(rows: &[&AssessedRow]) -> Vec<TierCountRow> {
    let mut counts: HashMap<ComplianceTier, usize> = HashMap::new();
    for r in rows {
        *counts.entry(r.metrics.tier).or_default() += 1;
    }
    ComplianceTier::ALL
        .iter()
        .map(|tier| TierCountRow {
            tier: *tier,
            label: tier.local_label().to_string(),
            units: counts.get(tier).copied().unwrap_or(0),
        })
        .collect()
}

/// Payment total per detected month column over the selected rows.
pub fn monthly_totals(assessment: &Assessment, rows: &[&AssessedRow]) -> Vec<MonthlyTotalRow> {
    monthly_sums(assessment, rows)
        .into_iter()
        .map(|(month, total)| MonthlyTotalRow {
            month,
            total_payment: format_number(total, 2),
        })
        .collect()
}

/// Raw month sums, in column order.
pub fn monthly_sums(assessment: &Assessment, rows: &[&AssessedRow]) -> Vec<(String, f64)> {
    assessment
        .month_columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let total: f64 = rows.iter().filter_map(|r| r.monthly.get(i)).sum();
            (col.header.clone(), total)
        })
        .collect()
}

/// The `n` rows with the largest total payment. Ties keep dataset order.
pub fn top_payers<'a>(rows: &[&'a AssessedRow], n: usize) -> Vec<&'a AssessedRow> {
    let mut sorted: Vec<&AssessedRow> = rows.to_vec();
    sorted.sort_by(|a, b| {
        b.metrics
            .total_payment
            .partial_cmp(&a.metrics.total_payment)
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

pub fn top_payer_table(rows: &[&AssessedRow]) -> Vec<TopPayerRow> {
    top_payers(rows, TOP_PAYERS)
        .into_iter()
        .enumerate()
        .map(|(idx, r)| TopPayerRow {
            rank: idx + 1,
            unit: r.unit.clone().unwrap_or_default(),
            total_payment: format_number(r.metrics.total_payment, 2),
        })
        .collect()
}

pub fn summary_table(rows: &[&AssessedRow]) -> Vec<SummaryRow> {
    rows.iter()
        .map(|r| SummaryRow {
            unit: r.unit.clone().unwrap_or_default(),
            status: r.status.clone().unwrap_or_default(),
            registration: r.registration.clone().unwrap_or_default(),
            total_payment: format_number(r.metrics.total_payment, 2),
            active_months: r.metrics.active_months,
            paid_months: r.metrics.paid_months,
            compliance_pct: format_number(r.metrics.compliance_pct, 2),
            tier: r.metrics.tier,
            avg_per_month: format_number(r.metrics.avg_per_paid_month, 2),
        })
        .collect()
}

pub fn overview(assessment: &Assessment, rows: &[&AssessedRow]) -> ComplianceOverview {
    let histogram = tier_histogram(rows);
    let count = |tier: ComplianceTier| {
        histogram
            .iter()
            .find(|h| h.tier == tier)
            .map(|h| h.units)
            .unwrap_or(0)
    };
    let total_payment: f64 = rows.iter().map(|r| r.metrics.total_payment).sum();
    let avg_compliance_pct = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.metrics.compliance_pct).sum::<f64>() / rows.len() as f64
    };
    ComplianceOverview {
        sheet: assessment.sheet.clone(),
        tax_type: assessment.config.tax_type.to_string(),
        fiscal_year: assessment.config.fiscal_year,
        total_units: rows.len(),
        total_payment,
        avg_compliance_pct,
        compliant: count(ComplianceTier::Compliant),
        partially_compliant: count(ComplianceTier::PartiallyCompliant),
        non_compliant: count(ComplianceTier::NonCompliant),
        inactive: count(ComplianceTier::Inactive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{assess, AssessmentConfig};
    use crate::types::{Cell, Dataset};

    fn assessment() -> Assessment {
        let headers = ["UPPPD", "STATUS", "TMT", "JAN", "FEB"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = |unit: &str, jan: f64, feb: f64| {
            vec![
                Cell::Text(unit.into()),
                Cell::Text("AKTIF".into()),
                Cell::Text("2024-01-01".into()),
                Cell::Number(jan),
                Cell::Number(feb),
            ]
        };
        let ds = Dataset::new(
            "s",
            headers,
            vec![
                row("A", 10.0, 0.0),
                row("B", 50.0, 50.0),
                row("C", 0.0, 0.0),
                row("D", 30.0, 30.0),
                row("E", 60.0, 0.0),
                row("F", 5.0, 5.0),
                row("G", 100.0, 0.0),
            ],
        );
        assess(&ds, &AssessmentConfig::default())
    }

    #[test]
    fn histogram_has_every_tier() {
        let a = assessment();
        let rows: Vec<&AssessedRow> = a.rows.iter().collect();
        let h = tier_histogram(&rows);
        assert_eq!(h.len(), 4);
        assert_eq!(h.iter().map(|r| r.units).sum::<usize>(), 7);
        assert_eq!(h[3].units, 0);
        assert_eq!(h[2].tier, ComplianceTier::NonCompliant);
        assert_eq!(h[2].label, "Tidak Patuh");
        assert_eq!(h[2].units, 7);
    }

    #[test]
    fn monthly_sums_follow_columns() {
        let a = assessment();
        let rows: Vec<&AssessedRow> = a.rows.iter().collect();
        let sums = monthly_sums(&a, &rows);
        assert_eq!(sums, vec![("JAN".to_string(), 255.0), ("FEB".to_string(), 85.0)]);
    }

    #[test]
    fn top_five_by_total_with_stable_ties() {
        let a = assessment();
        let rows: Vec<&AssessedRow> = a.rows.iter().collect();
        let top: Vec<&str> = top_payers(&rows, TOP_PAYERS)
            .into_iter()
            .map(|r| r.unit.as_deref().unwrap())
            .collect();
        assert_eq!(top, vec!["B", "G", "D", "E", "A"]);
    }

    #[test]
    fn summary_formats_values() {
        let a = assessment();
        let rows: Vec<&AssessedRow> = a.rows.iter().collect();
        let table = summary_table(&rows);
        assert_eq!(table[1].total_payment, "100.00");
        assert_eq!(table[1].compliance_pct, "16.67");
        assert_eq!(table[1].registration, "2024-01-01");
    }

    #[test]
    fn overview_counts() {
        let a = assessment();
        let rows: Vec<&AssessedRow> = a.rows.iter().collect();
        let o = overview(&a, &rows);
        assert_eq!(o.total_units, 7);
        assert_eq!(o.total_payment, 340.0);
        assert_eq!(o.non_compliant, 7);
    }
}
