pub mod dashboard_repo;
pub mod lab_repo;
pub mod pathogen_repo;

use async_trait::async_trait;

use crate::models::{LabRecord, LabTestResult, Officer};

pub use dashboard_repo::DashboardRepository;
pub use lab_repo::PgLabStore;
pub use pathogen_repo::PathogenRepository;

/// Read access to everything a report needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabStore: Send + Sync {
    /// The lab case with its joined reference rows, or `None` if the id is unknown.
    async fn find_lab(&self, id: i32) -> Result<Option<LabRecord>, sqlx::Error>;

    /// Sub-results of a case in insertion order.
    async fn find_lab_tests(&self, lab_id: i32) -> Result<Vec<LabTestResult>, sqlx::Error>;

    async fn find_officer(&self, id: i32) -> Result<Option<Officer>, sqlx::Error>;
}
