//! Flattening a lab case into the values a layout prints.

use serde::Serialize;

use super::panel::PanelKind;
use super::template::TemplateVariant;
use crate::models::{LabRecord, LabTestResult};

pub const PANEL_DEFAULT_RESULT: &str = "Not detected";
pub const PANEL_DEFAULT_REMARK: &str = "-";

/// A lab case with everything a layout needs already resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportData {
    pub lab: LabRecord,
    /// Sub-results in insertion order.
    pub tests: Vec<LabTestResult>,
    pub reporter: String,
    pub approver: String,
}

impl ReportData {
    pub fn variant(&self) -> TemplateVariant {
        let name = self.lab.machine_name();
        TemplateVariant::select((!name.is_empty()).then_some(name))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathogenRow {
    pub name: String,
    pub result: String,
    pub remark: String,
}

impl PathogenRow {
    fn from_test(test: &LabTestResult) -> Self {
        Self {
            name: test.pathogen_name().to_string(),
            result: test.result_text().to_string(),
            remark: test.remark_text().to_string(),
        }
    }
}

/// Result rows for a layout, in print order.
pub fn pathogen_rows(
    variant: TemplateVariant,
    lab: &LabRecord,
    tests: &[LabTestResult],
) -> Vec<PathogenRow> {
    match variant {
        TemplateVariant::Monkeypox | TemplateVariant::Igra => {
            tests.iter().take(1).map(PathogenRow::from_test).collect()
        }
        TemplateVariant::RespiratoryPanel => match PanelKind::from_prefix(lab.panel_prefix()) {
            Some(kind) => panel_rows(kind, tests),
            None => insertion_rows(tests),
        },
        TemplateVariant::CovidMp | TemplateVariant::Immunology | TemplateVariant::Generic => {
            insertion_rows(tests)
        }
    }
}

fn insertion_rows(tests: &[LabTestResult]) -> Vec<PathogenRow> {
    tests.iter().map(PathogenRow::from_test).collect()
}

/// Every analyte of the panel in panel order. Analytes without a matching
/// sub-result get the panel defaults; sub-results outside the panel are dropped.
pub fn panel_rows(kind: PanelKind, tests: &[LabTestResult]) -> Vec<PathogenRow> {
    kind.order()
        .iter()
        .map(|name| {
            let matched = tests.iter().find(|t| t.pathogen_name() == *name);
            let result = matched
                .map(LabTestResult::result_text)
                .filter(|r| !r.trim().is_empty())
                .unwrap_or(PANEL_DEFAULT_RESULT);
            let remark = matched
                .map(LabTestResult::remark_text)
                .filter(|r| !r.trim().is_empty())
                .unwrap_or(PANEL_DEFAULT_REMARK);
            PathogenRow {
                name: name.to_string(),
                result: result.to_string(),
                remark: remark.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pathogen, TestType};

    fn test(id: i32, pathogen: &str, result: &str, remark: &str) -> LabTestResult {
        LabTestResult {
            id,
            lab_id: 1,
            result: Some(result.into()),
            remark: Some(remark.into()),
            pathogen: Some(Pathogen::new(id, pathogen)),
        }
    }

    fn panel_lab(prefix: &str) -> LabRecord {
        LabRecord {
            test_type: Some(TestType {
                id: 1,
                name: None,
                prefix_name: Some(prefix.into()),
            }),
            ..LabRecord::new(1)
        }
    }

    #[test]
    fn generic_keeps_insertion_order() {
        let tests = vec![test(1, "B", "Detected", ""), test(2, "A", "Not detected", "")];
        let rows = pathogen_rows(TemplateVariant::Generic, &LabRecord::new(1), &tests);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "B");
        assert_eq!(rows[1].name, "A");
    }

    #[test]
    fn single_analyte_forms_use_first_result() {
        let tests = vec![test(1, "MPXV", "Detected", ""), test(2, "Other", "Detected", "")];
        for variant in [TemplateVariant::Monkeypox, TemplateVariant::Igra] {
            let rows = pathogen_rows(variant, &LabRecord::new(1), &tests);
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].name, "MPXV");
        }
        assert!(pathogen_rows(TemplateVariant::Igra, &LabRecord::new(1), &[]).is_empty());
    }

    #[test]
    fn panel_rows_follow_panel_order_with_defaults() {
        let tests = vec![
            test(1, "Mycoplasma pneumoniae (MP)", "Detected", "28.1"),
            test(2, "2019-nCoV", "Detected", ""),
            test(3, "Not On Panel", "Detected", "12"),
        ];
        let rows = pathogen_rows(
            TemplateVariant::RespiratoryPanel,
            &panel_lab("Respiratory Pathogen 23"),
            &tests,
        );

        assert_eq!(rows.len(), 23);
        assert_eq!(rows[0].name, "2019-nCoV");
        assert_eq!(rows[0].result, "Detected");
        assert_eq!(rows[0].remark, PANEL_DEFAULT_REMARK);
        assert_eq!(rows[1].result, PANEL_DEFAULT_RESULT);
        assert_eq!(rows[22].remark, "28.1");
        assert!(rows.iter().all(|r| r.name != "Not On Panel"));
    }

    #[test]
    fn first_matching_sub_result_wins() {
        let tests = vec![
            test(1, "SARS-CoV-2", "Detected", "20"),
            test(2, "SARS-CoV-2", "Not detected", ""),
        ];
        let rows = panel_rows(PanelKind::Rp27, &tests);
        assert_eq!(rows[0].name, "SARS-CoV-2");
        assert_eq!(rows[0].result, "Detected");
        assert_eq!(rows[0].remark, "20");
    }

    #[test]
    fn unknown_panel_falls_back_to_insertion_order() {
        let tests = vec![test(1, "Z", "Detected", ""), test(2, "Y", "Detected", "")];
        let rows = pathogen_rows(
            TemplateVariant::RespiratoryPanel,
            &panel_lab("Respiratory Pathogen 99"),
            &tests,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Z");
    }
}
