use serde::{Deserialize, Serialize};

use super::pathogen::Pathogen;

/// One pathogen-level result row belonging to a lab case.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabTestResult {
    pub id: i32,
    pub lab_id: i32,
    pub result: Option<String>,
    /// Free-text remark; holds the Ct value on PCR panels.
    pub remark: Option<String>,
    pub pathogen: Option<Pathogen>,
}

impl LabTestResult {
    pub fn pathogen_name(&self) -> &str {
        self.pathogen
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or_default()
    }

    pub fn result_text(&self) -> &str {
        self.result.as_deref().unwrap_or_default()
    }

    pub fn remark_text(&self) -> &str {
        self.remark.as_deref().unwrap_or_default()
    }
}
