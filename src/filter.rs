// Post-assessment row selection by unit, status and classification.
//
// Filtering only picks rows; metrics were computed over the full dataset
// beforehand and are never touched here.
use crate::pipeline::Assessment;
use crate::types::AssessedRow;

/// Distinct values available for each filter, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub units: Vec<String>,
    pub statuses: Vec<String>,
    pub classifications: Vec<String>,
}

/// What the user picked. `None` means every available option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub units: Option<Vec<String>>,
    pub statuses: Option<Vec<String>>,
    pub classifications: Option<Vec<String>>,
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values.flatten() {
        if !out.contains(v) {
            out.push(v.clone());
        }
    }
    out
}

impl FilterOptions {
    /// Classification options are only offered for entertainment tax and
    /// only when the sheet has a classification column; otherwise empty.
    pub fn from_assessment(assessment: &Assessment) -> Self {
        let rows = &assessment.rows;
        let classifications =
            if assessment.config.tax_type.uses_classification() && assessment.has_classification {
                distinct(rows.iter().map(|r| r.classification.as_ref()))
            } else {
                Vec::new()
            };
        FilterOptions {
            units: distinct(rows.iter().map(|r| r.unit.as_ref())),
            statuses: distinct(rows.iter().map(|r| r.status.as_ref())),
            classifications,
        }
    }
}

/// Rows passing the filter on one dimension. An empty option list (the
/// column is missing) leaves the dimension unconstrained.
fn passes(value: Option<&String>, options: &[String], selected: Option<&Vec<String>>) -> bool {
    if options.is_empty() {
        return true;
    }
    let selected = selected.map(Vec::as_slice).unwrap_or(options);
    value.map(|v| selected.contains(v)).unwrap_or(false)
}

/// Select the rows matching `selection`, keeping dataset order.
///
/// A row with a missing unit or status never matches a constrained
/// dimension. The classification filter applies to entertainment tax only
/// and is skipped when nothing is selected.
pub fn apply<'a>(
    assessment: &'a Assessment,
    options: &FilterOptions,
    selection: &FilterSelection,
) -> Vec<&'a AssessedRow> {
    let selected_classes = selection
        .classifications
        .as_ref()
        .unwrap_or(&options.classifications);
    let filter_classes = assessment.config.tax_type.uses_classification() && !selected_classes.is_empty();

    assessment
        .rows
        .iter()
        .filter(|r| passes(r.unit.as_ref(), &options.units, selection.units.as_ref()))
        .filter(|r| passes(r.status.as_ref(), &options.statuses, selection.statuses.as_ref()))
        .filter(|r| {
            !filter_classes
                || r.classification
                    .as_ref()
                    .map(|c| selected_classes.contains(c))
                    .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{assess, AssessmentConfig, TaxType};
    use crate::types::{Cell, Dataset};

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sample(tax_type: TaxType) -> Assessment {
        let headers = ["UNIT", "STATUS", "JENIS", "TMT", "JAN"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ds = Dataset::new(
            "s",
            headers,
            vec![
                vec![t("A"), t("AKTIF"), t("Karaoke"), t("2020-01-01"), Cell::Number(5.0)],
                vec![t("B"), t("TUTUP"), t("Bioskop"), t("2020-01-01"), Cell::Number(7.0)],
                vec![t("A"), t("AKTIF"), Cell::Empty, t("2020-01-01"), Cell::Number(9.0)],
                vec![Cell::Empty, t("AKTIF"), t("Karaoke"), t("2020-01-01"), Cell::Number(1.0)],
            ],
        );
        assess(&ds, &AssessmentConfig::new(tax_type, 2024).unwrap())
    }

    #[test]
    fn options_are_distinct_in_order() {
        let a = sample(TaxType::Entertainment);
        let o = FilterOptions::from_assessment(&a);
        assert_eq!(o.units, vec!["A", "B"]);
        assert_eq!(o.statuses, vec!["AKTIF", "TUTUP"]);
        assert_eq!(o.classifications, vec!["Karaoke", "Bioskop"]);
    }

    #[test]
    fn food_tax_has_no_classification_options() {
        let a = sample(TaxType::FoodBeverage);
        assert!(FilterOptions::from_assessment(&a).classifications.is_empty());
    }

    #[test]
    fn default_selection_drops_rows_missing_keys() {
        let a = sample(TaxType::FoodBeverage);
        let o = FilterOptions::from_assessment(&a);
        let rows = apply(&a, &o, &FilterSelection::default());
        let idx: Vec<usize> = rows.iter().map(|r| r.source_index).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn entertainment_filters_on_classification() {
        let a = sample(TaxType::Entertainment);
        let o = FilterOptions::from_assessment(&a);
        let sel = FilterSelection {
            classifications: Some(vec!["Karaoke".into()]),
            ..Default::default()
        };
        let idx: Vec<usize> = apply(&a, &o, &sel).iter().map(|r| r.source_index).collect();
        assert_eq!(idx, vec![0]);
    }

    #[test]
    fn empty_class_selection_is_ignored() {
        let a = sample(TaxType::Entertainment);
        let o = FilterOptions::from_assessment(&a);
        let sel = FilterSelection {
            statuses: Some(vec!["AKTIF".into()]),
            classifications: Some(Vec::new()),
            ..Default::default()
        };
        let idx: Vec<usize> = apply(&a, &o, &sel).iter().map(|r| r.source_index).collect();
        assert_eq!(idx, vec![0, 2]);
    }

    #[test]
    fn filtering_keeps_metrics() {
        let a = sample(TaxType::FoodBeverage);
        let o = FilterOptions::from_assessment(&a);
        let sel = FilterSelection {
            units: Some(vec!["B".into()]),
            ..Default::default()
        };
        let rows = apply(&a, &o, &sel);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], &a.rows[1]);
    }
}
