use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::LabStore;
use crate::models::{
    Hospital, InspectionType, LabRecord, LabTestResult, Machine, Officer, Pathogen, Patient,
    TestType,
};

const LAB_QUERY: &str = r#"
SELECT
    l.id, l.case_no, l.detection_method, l.comment, l.result,
    l.report_date, l.report_time, l.approve_date, l.approve_time,
    l.report_by_id, l.approve_by_id, l.count_update, l.updated_at,
    p.id AS patient_id, p.first_name, p.last_name, p.age, p.gender,
    p.id_card, p.sat_id, p.hn, p.an, p.date_of_birth,
    p.collected_date, p.collected_time, p.received_date, p.received_time,
    p.visit_type,
    h.id AS hospital_id, h.name AS hospital_name,
    t.id AS test_type_id, t.name AS test_type_name, t.prefix_name,
    m.id AS machine_id, m.name AS machine_name,
    i.id AS inspection_type_id, i.name AS inspection_type_name
FROM lab l
LEFT JOIN patient p ON p.id = l.patient_id
LEFT JOIN hospital h ON h.id = l.hospital_id
LEFT JOIN test_type t ON t.id = l.test_type_id
LEFT JOIN machine m ON m.id = l.machine_id
LEFT JOIN inspection_type i ON i.id = l.inspection_type_id
WHERE l.id = $1
"#;

const LAB_TESTS_QUERY: &str = r#"
SELECT
    lt.id, lt.lab_id, lt.result, lt.remark,
    pa.id AS pathogen_id, pa.name AS pathogen_name, pa.description AS pathogen_description
FROM lab_test lt
LEFT JOIN pathogens pa ON pa.id = lt.pathogens_id
WHERE lt.lab_id = $1
ORDER BY lt.id
"#;

const OFFICER_QUERY: &str =
    "SELECT id, title_name, first_name, last_name FROM officer WHERE id = $1";

/// One row of the lab join, before it is split into nested entities.
#[derive(Debug, sqlx::FromRow)]
struct LabRow {
    id: i32,
    case_no: Option<String>,
    detection_method: Option<String>,
    comment: Option<String>,
    result: Option<i32>,
    report_date: Option<NaiveDateTime>,
    report_time: Option<String>,
    approve_date: Option<NaiveDateTime>,
    approve_time: Option<String>,
    report_by_id: Option<i32>,
    approve_by_id: Option<i32>,
    count_update: Option<i32>,
    updated_at: Option<NaiveDateTime>,
    patient_id: Option<i32>,
    first_name: Option<String>,
    last_name: Option<String>,
    age: Option<i32>,
    gender: Option<String>,
    id_card: Option<String>,
    sat_id: Option<String>,
    hn: Option<String>,
    an: Option<String>,
    date_of_birth: Option<NaiveDateTime>,
    collected_date: Option<NaiveDateTime>,
    collected_time: Option<String>,
    received_date: Option<NaiveDateTime>,
    received_time: Option<String>,
    visit_type: Option<String>,
    hospital_id: Option<i32>,
    hospital_name: Option<String>,
    test_type_id: Option<i32>,
    test_type_name: Option<String>,
    prefix_name: Option<String>,
    machine_id: Option<i32>,
    machine_name: Option<String>,
    inspection_type_id: Option<i32>,
    inspection_type_name: Option<String>,
}

impl From<LabRow> for LabRecord {
    fn from(row: LabRow) -> Self {
        let patient = row.patient_id.map(|id| Patient {
            id,
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            gender: row.gender,
            id_card: row.id_card,
            sat_id: row.sat_id,
            hn: row.hn,
            an: row.an,
            case_no: row.case_no.clone(),
            date_of_birth: row.date_of_birth,
            collected_date: row.collected_date,
            collected_time: row.collected_time,
            received_date: row.received_date,
            received_time: row.received_time,
            visit_type: row.visit_type,
        });

        LabRecord {
            id: row.id,
            case_no: row.case_no,
            detection_method: row.detection_method,
            comment: row.comment,
            result: row.result,
            report_date: row.report_date,
            report_time: row.report_time,
            approve_date: row.approve_date,
            approve_time: row.approve_time,
            report_by_id: row.report_by_id,
            approve_by_id: row.approve_by_id,
            count_update: row.count_update,
            updated_at: row.updated_at,
            patient,
            hospital: row.hospital_id.map(|id| Hospital {
                id,
                name: row.hospital_name,
            }),
            test_type: row.test_type_id.map(|id| TestType {
                id,
                name: row.test_type_name,
                prefix_name: row.prefix_name,
            }),
            machine: row.machine_id.map(|id| Machine {
                id,
                name: row.machine_name,
            }),
            inspection_type: row.inspection_type_id.map(|id| InspectionType {
                id,
                name: row.inspection_type_name,
            }),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LabTestRow {
    id: i32,
    lab_id: i32,
    result: Option<String>,
    remark: Option<String>,
    pathogen_id: Option<i32>,
    pathogen_name: Option<String>,
    pathogen_description: Option<String>,
}

impl From<LabTestRow> for LabTestResult {
    fn from(row: LabTestRow) -> Self {
        let pathogen = row.pathogen_id.map(|id| Pathogen {
            id,
            name: row.pathogen_name.unwrap_or_default(),
            description: row.pathogen_description,
        });
        LabTestResult {
            id: row.id,
            lab_id: row.lab_id,
            result: row.result,
            remark: row.remark,
            pathogen,
        }
    }
}

/// `LabStore` backed by the Postgres schema.
#[derive(Clone)]
pub struct PgLabStore {
    pool: PgPool,
}

impl PgLabStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LabStore for PgLabStore {
    async fn find_lab(&self, id: i32) -> Result<Option<LabRecord>, sqlx::Error> {
        let row = sqlx::query_as::<_, LabRow>(LAB_QUERY)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(LabRecord::from))
    }

    async fn find_lab_tests(&self, lab_id: i32) -> Result<Vec<LabTestResult>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LabTestRow>(LAB_TESTS_QUERY)
            .bind(lab_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(LabTestResult::from).collect())
    }

    async fn find_officer(&self, id: i32) -> Result<Option<Officer>, sqlx::Error> {
        sqlx::query_as::<_, Officer>(OFFICER_QUERY)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_row(id: i32) -> LabRow {
        LabRow {
            id,
            case_no: Some("C-1".into()),
            detection_method: None,
            comment: None,
            result: Some(1),
            report_date: None,
            report_time: None,
            approve_date: None,
            approve_time: None,
            report_by_id: None,
            approve_by_id: None,
            count_update: None,
            updated_at: None,
            patient_id: None,
            first_name: None,
            last_name: None,
            age: None,
            gender: None,
            id_card: None,
            sat_id: None,
            hn: None,
            an: None,
            date_of_birth: None,
            collected_date: None,
            collected_time: None,
            received_date: None,
            received_time: None,
            visit_type: None,
            hospital_id: None,
            hospital_name: None,
            test_type_id: None,
            test_type_name: None,
            prefix_name: None,
            machine_id: None,
            machine_name: None,
            inspection_type_id: None,
            inspection_type_name: None,
        }
    }

    #[test]
    fn missing_joins_become_none() {
        let lab = LabRecord::from(bare_row(3));
        assert_eq!(lab.id, 3);
        assert!(lab.patient.is_none());
        assert!(lab.machine.is_none());
        assert!(lab.test_type.is_none());
    }

    #[test]
    fn joined_rows_are_nested() {
        let mut row = bare_row(4);
        row.patient_id = Some(9);
        row.first_name = Some("Somchai".into());
        row.machine_id = Some(2);
        row.machine_name = Some("FM 02-005(A)".into());
        let lab = LabRecord::from(row);

        let patient = lab.patient.as_ref().expect("patient joined");
        assert_eq!(patient.id, 9);
        assert_eq!(patient.case_no.as_deref(), Some("C-1"));
        assert_eq!(lab.machine_name(), "FM 02-005(A)");
    }

    #[test]
    fn sub_result_without_pathogen_keeps_row() {
        let row = LabTestRow {
            id: 1,
            lab_id: 4,
            result: Some("Detected".into()),
            remark: None,
            pathogen_id: None,
            pathogen_name: None,
            pathogen_description: None,
        };
        let test = LabTestResult::from(row);
        assert_eq!(test.pathogen_name(), "");
        assert_eq!(test.result_text(), "Detected");
    }
}
