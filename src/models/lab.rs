use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::join_words;

/// Overall outcome recorded on a lab case. Stored as 1..=6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    Detected,
    NotDetected,
    Positive,
    Negative,
    Indeterminate,
    Borderline,
}

impl ResultCode {
    pub const ALL: [ResultCode; 6] = [
        ResultCode::Detected,
        ResultCode::NotDetected,
        ResultCode::Positive,
        ResultCode::Negative,
        ResultCode::Indeterminate,
        ResultCode::Borderline,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ResultCode::Detected),
            2 => Some(ResultCode::NotDetected),
            3 => Some(ResultCode::Positive),
            4 => Some(ResultCode::Negative),
            5 => Some(ResultCode::Indeterminate),
            6 => Some(ResultCode::Borderline),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ResultCode::Detected => 1,
            ResultCode::NotDetected => 2,
            ResultCode::Positive => 3,
            ResultCode::Negative => 4,
            ResultCode::Indeterminate => 5,
            ResultCode::Borderline => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResultCode::Detected => "Detected",
            ResultCode::NotDetected => "Not Detected",
            ResultCode::Positive => "Positive",
            ResultCode::Negative => "Negative",
            ResultCode::Indeterminate => "Indeterminate",
            ResultCode::Borderline => "Borderline",
        }
    }

    /// The spelling used in `lab_test.result` for this outcome.
    pub fn sub_result_value(self) -> &'static str {
        match self {
            ResultCode::NotDetected => "Not detected",
            other => other.label(),
        }
    }

    /// Outcomes counted as a finding on the dashboard.
    pub fn is_finding(self) -> bool {
        matches!(
            self,
            ResultCode::Detected
                | ResultCode::Positive
                | ResultCode::Indeterminate
                | ResultCode::Borderline
        )
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub id_card: Option<String>,
    pub sat_id: Option<String>,
    pub hn: Option<String>,
    pub an: Option<String>,
    pub case_no: Option<String>,
    pub date_of_birth: Option<NaiveDateTime>,
    pub collected_date: Option<NaiveDateTime>,
    pub collected_time: Option<String>,
    pub received_date: Option<NaiveDateTime>,
    pub received_time: Option<String>,
    pub visit_type: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        join_words([
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default(),
        ])
    }

    pub fn age_text(&self) -> String {
        self.age.map(|a| a.to_string()).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: i32,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestType {
    pub id: i32,
    pub name: Option<String>,
    pub prefix_name: Option<String>,
}

/// Instrument, and also the report form to print for its results.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i32,
    pub name: Option<String>,
}

/// Specimen type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionType {
    pub id: i32,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabRecord {
    pub id: i32,
    pub case_no: Option<String>,
    pub detection_method: Option<String>,
    pub comment: Option<String>,
    pub result: Option<i32>,
    pub report_date: Option<NaiveDateTime>,
    pub report_time: Option<String>,
    pub approve_date: Option<NaiveDateTime>,
    pub approve_time: Option<String>,
    pub report_by_id: Option<i32>,
    pub approve_by_id: Option<i32>,
    pub count_update: Option<i32>,
    pub updated_at: Option<NaiveDateTime>,
    pub patient: Option<Patient>,
    pub hospital: Option<Hospital>,
    pub test_type: Option<TestType>,
    pub machine: Option<Machine>,
    pub inspection_type: Option<InspectionType>,
}

impl LabRecord {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn result_code(&self) -> Option<ResultCode> {
        self.result.and_then(ResultCode::from_code)
    }

    pub fn machine_name(&self) -> &str {
        self.machine
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .unwrap_or_default()
    }

    pub fn panel_prefix(&self) -> &str {
        self.test_type
            .as_ref()
            .and_then(|t| t.prefix_name.as_deref())
            .unwrap_or_default()
    }

    pub fn hospital_name(&self) -> &str {
        self.hospital
            .as_ref()
            .and_then(|h| h.name.as_deref())
            .unwrap_or_default()
    }

    pub fn specimen_name(&self) -> &str {
        self.inspection_type
            .as_ref()
            .and_then(|i| i.name.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_codes_round_trip_through_storage_value() {
        for code in ResultCode::ALL {
            assert_eq!(ResultCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ResultCode::from_code(0), None);
        assert_eq!(ResultCode::from_code(7), None);
    }

    #[test]
    fn not_detected_uses_sub_result_spelling() {
        assert_eq!(ResultCode::NotDetected.label(), "Not Detected");
        assert_eq!(ResultCode::NotDetected.sub_result_value(), "Not detected");
        assert_eq!(ResultCode::Borderline.sub_result_value(), "Borderline");
    }

    #[test]
    fn missing_joins_degrade_to_empty_strings() {
        let lab = LabRecord::new(1);
        assert_eq!(lab.machine_name(), "");
        assert_eq!(lab.panel_prefix(), "");
        assert_eq!(lab.hospital_name(), "");
        assert_eq!(lab.specimen_name(), "");
        assert_eq!(lab.result_code(), None);
    }

    #[test]
    fn patient_name_skips_missing_parts() {
        let patient = Patient {
            first_name: Some("Somsri".into()),
            ..Default::default()
        };
        assert_eq!(patient.full_name(), "Somsri");
        assert_eq!(patient.age_text(), "");
    }
}
