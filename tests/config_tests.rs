//! Startup wiring: which assets are required and which are optional.

mod common;

use common::test_config;
use labreport::services::AppState;
use sqlx::postgres::PgPoolOptions;

fn build(config: labreport::config::Config) -> anyhow::Result<AppState> {
    tokio_test::block_on(async {
        let db = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&config.database_url)?;
        AppState::new(db, config).await
    })
}

#[test]
fn missing_logo_is_not_fatal() {
    let mut config = test_config();
    config.logo_path = "/nonexistent/logo.png".to_string();

    let state = build(config);
    assert!(state.is_ok(), "a missing logo must only be logged");
}

#[test]
fn font_dir_without_faces_is_fatal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = test_config();
    config.font_dir = Some(dir.path().display().to_string());

    let err = build(config).err().expect("fonts are required once configured");
    assert!(err.to_string().contains("THSarabun"), "{}", err);
}
