pub mod aggregator;
pub mod dashboard;

use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::report::assets::{FontFaces, Logo};
use crate::report::{DocumentRenderer, PdfRenderer};
use crate::repository::{LabStore, PgLabStore};

pub use aggregator::{LayoutChoice, RenderedReport, ReportService};
pub use dashboard::DashboardService;

pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub reports: ReportService,
}

impl AppState {
    /// Production wiring: Postgres store, logo and fonts from the configured
    /// paths. A missing logo is logged and reports print without it; missing
    /// fonts are an error.
    pub async fn new(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let logo = match Logo::load(Path::new(&config.logo_path)).await {
            Ok(logo) => Some(logo),
            Err(e) => {
                tracing::warn!(error = %e, "logo unavailable, reports will omit it");
                None
            }
        };

        let renderer = match &config.font_dir {
            Some(dir) => PdfRenderer::with_fonts(FontFaces::load(Path::new(dir)).await?),
            None => {
                tracing::warn!("FONT_DIR not set, falling back to built-in fonts");
                PdfRenderer::builtin()
            }
        };

        let store: Arc<dyn LabStore> = Arc::new(PgLabStore::new(db.clone()));
        Ok(Self::with_parts(db, config, store, Arc::new(renderer), logo))
    }

    pub fn with_parts(
        db: PgPool,
        config: Config,
        store: Arc<dyn LabStore>,
        renderer: Arc<dyn DocumentRenderer>,
        logo: Option<Logo>,
    ) -> Self {
        Self {
            db,
            config,
            reports: ReportService::new(store, renderer, logo),
        }
    }
}
