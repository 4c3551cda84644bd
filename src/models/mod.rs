pub mod lab;
pub mod lab_test;
pub mod officer;
pub mod pathogen;

pub use lab::{Hospital, InspectionType, LabRecord, Machine, Patient, ResultCode, TestType};
pub use lab_test::LabTestResult;
pub use officer::Officer;
pub use pathogen::Pathogen;
