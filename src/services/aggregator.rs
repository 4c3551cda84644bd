use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::error::{ReportError, Result};
use crate::models::officer::display_name;
use crate::models::Officer;
use crate::report::assets::Logo;
use crate::report::layout::{self, LayoutContext};
use crate::report::{DocumentDescription, DocumentRenderer, ReportData, TemplateVariant};
use crate::repository::LabStore;

/// Which layout a report request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutChoice {
    /// The form selected by the case's machine.
    Selected,
    /// The institute's generic layout, whatever the machine.
    Generic,
}

#[derive(Debug)]
pub struct RenderedReport {
    pub variant: TemplateVariant,
    pub fingerprint: String,
    /// Media type of `bytes`, as reported by the renderer.
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn LabStore>,
    renderer: Arc<dyn DocumentRenderer>,
    logo: Option<Logo>,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn LabStore>,
        renderer: Arc<dyn DocumentRenderer>,
        logo: Option<Logo>,
    ) -> Self {
        Self {
            store,
            renderer,
            logo,
        }
    }

    /// Loads a case, its sub-results and the names of its officers.
    pub async fn aggregate(&self, lab_id: i32) -> Result<ReportData> {
        let lab = self
            .store
            .find_lab(lab_id)
            .await?
            .ok_or_else(|| ReportError::not_found("Lab", lab_id))?;

        let (tests, reporter, approver) = futures::try_join!(
            self.store.find_lab_tests(lab.id),
            self.officer(lab.report_by_id),
            self.officer(lab.approve_by_id),
        )?;

        Ok(ReportData {
            reporter: display_name(reporter.as_ref()),
            approver: display_name(approver.as_ref()),
            lab,
            tests,
        })
    }

    async fn officer(&self, id: Option<i32>) -> std::result::Result<Option<Officer>, sqlx::Error> {
        match id {
            Some(id) => self.store.find_officer(id).await,
            None => Ok(None),
        }
    }

    pub fn variant_for(data: &ReportData, choice: LayoutChoice) -> TemplateVariant {
        match choice {
            LayoutChoice::Selected => data.variant(),
            LayoutChoice::Generic => TemplateVariant::Generic,
        }
    }

    pub fn describe(
        &self,
        data: &ReportData,
        variant: TemplateVariant,
        generated_at: NaiveDateTime,
    ) -> DocumentDescription {
        let ctx = LayoutContext {
            logo: self.logo.as_ref().map(Logo::data_uri),
            generated_at,
        };
        layout::build(variant, data, &ctx)
    }

    /// Full pipeline for one request. `generated_at` is supplied by the
    /// caller so identical inputs produce identical documents.
    pub async fn render(
        &self,
        lab_id: i32,
        choice: LayoutChoice,
        generated_at: NaiveDateTime,
    ) -> Result<RenderedReport> {
        let data = self.aggregate(lab_id).await?;
        let variant = Self::variant_for(&data, choice);
        let document = self.describe(&data, variant, generated_at);

        let rendering_error = |message: String| ReportError::Rendering {
            lab_id,
            variant,
            message,
        };
        let fingerprint = document
            .fingerprint()
            .map_err(|e| rendering_error(e.to_string()))?;

        let renderer = Arc::clone(&self.renderer);
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|e| rendering_error(e.to_string()))?
            .map_err(|e| rendering_error(e.to_string()))?;

        tracing::info!(lab_id, variant = %variant, bytes = bytes.len(), "report rendered");
        Ok(RenderedReport {
            variant,
            fingerprint,
            content_type: self.renderer.content_type(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LabRecord, LabTestResult, Machine, Pathogen};
    use crate::report::RenderError;
    use crate::repository::MockLabStore;
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    struct StubRenderer;

    impl DocumentRenderer for StubRenderer {
        fn render(&self, doc: &DocumentDescription) -> std::result::Result<Vec<u8>, RenderError> {
            Ok(doc.title.clone().into_bytes())
        }

        fn content_type(&self) -> &'static str {
            "text/plain"
        }
    }

    struct FailingRenderer;

    impl DocumentRenderer for FailingRenderer {
        fn render(&self, _: &DocumentDescription) -> std::result::Result<Vec<u8>, RenderError> {
            Err(RenderError::Font("no glyphs".into()))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid timestamp")
    }

    fn service(store: MockLabStore, renderer: Arc<dyn DocumentRenderer>) -> ReportService {
        ReportService::new(Arc::new(store), renderer, None)
    }

    fn igra_lab(id: i32) -> LabRecord {
        LabRecord {
            machine: Some(Machine {
                id: 1,
                name: Some("FM 02-000(A) แบบฟอร์มการรายงานผล IGRA".into()),
            }),
            report_by_id: Some(7),
            ..LabRecord::new(id)
        }
    }

    #[tokio::test]
    async fn unknown_lab_is_not_found_and_skips_other_lookups() {
        let mut store = MockLabStore::new();
        store.expect_find_lab().with(eq(99)).returning(|_| Ok(None));
        store.expect_find_lab_tests().never();
        store.expect_find_officer().never();

        let err = service(store, Arc::new(StubRenderer))
            .aggregate(99)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NotFound { entity: "Lab", id: 99 }));
    }

    #[tokio::test]
    async fn null_officer_reference_is_unknown_without_lookup() {
        let mut store = MockLabStore::new();
        store.expect_find_lab().returning(|id| Ok(Some(igra_lab(id))));
        store.expect_find_lab_tests().returning(|lab_id| {
            Ok(vec![LabTestResult {
                id: 1,
                lab_id,
                result: Some("Positive".into()),
                remark: Some("1.2".into()),
                pathogen: Some(Pathogen::new(3, "M. tuberculosis")),
            }])
        });
        store
            .expect_find_officer()
            .with(eq(7))
            .times(1)
            .returning(|id| {
                Ok(Some(Officer {
                    id,
                    title_name: Some("Dr.".into()),
                    first_name: Some("Anan".into()),
                    last_name: None,
                }))
            });

        let data = service(store, Arc::new(StubRenderer))
            .aggregate(5)
            .await
            .expect("aggregates");
        assert_eq!(data.reporter, "Dr. Anan");
        assert_eq!(data.approver, "Unknown");
        assert_eq!(data.tests.len(), 1);
        assert_eq!(data.variant(), TemplateVariant::Igra);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let mut store = MockLabStore::new();
        store.expect_find_lab().returning(|_| Err(sqlx::Error::PoolTimedOut));

        let err = service(store, Arc::new(StubRenderer)).aggregate(1).await.unwrap_err();
        assert!(matches!(err, ReportError::Store(_)));
    }

    #[tokio::test]
    async fn generic_choice_overrides_machine() {
        let mut store = MockLabStore::new();
        store.expect_find_lab().returning(|id| Ok(Some(igra_lab(id))));
        store.expect_find_lab_tests().returning(|_| Ok(vec![]));
        store.expect_find_officer().returning(|_| Ok(None));

        let report = service(store, Arc::new(StubRenderer))
            .render(5, LayoutChoice::Generic, now())
            .await
            .expect("renders");
        assert_eq!(report.variant, TemplateVariant::Generic);
        assert_eq!(report.fingerprint.len(), 64);
        assert_eq!(report.content_type, "text/plain");
    }

    #[tokio::test]
    async fn renderer_failure_names_lab_and_variant() {
        let mut store = MockLabStore::new();
        store.expect_find_lab().returning(|id| Ok(Some(igra_lab(id))));
        store.expect_find_lab_tests().returning(|_| Ok(vec![]));
        store.expect_find_officer().returning(|_| Ok(None));

        let err = service(store, Arc::new(FailingRenderer))
            .render(5, LayoutChoice::Selected, now())
            .await
            .unwrap_err();
        match err {
            ReportError::Rendering { lab_id, variant, message } => {
                assert_eq!(lab_id, 5);
                assert_eq!(variant, TemplateVariant::Igra);
                assert!(message.contains("no glyphs"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
