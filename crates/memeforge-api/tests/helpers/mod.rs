//! Test helpers: build the application over temporary directories for integration tests.
//!
//! Run from workspace root: `cargo test -p memeforge-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use memeforge_api::state::AppState;
use memeforge_core::Config;
use std::sync::Arc;
use tempfile::TempDir;

pub const CLASSIC_SIZE: (u32, u32) = (502, 500);
pub const DETAILED_SIZE: (u32, u32) = (500, 490);

/// Test application: server, state, and the temp directory backing it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub config: Config,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup test app with default limits.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut config = Config {
        upload_dir: temp_dir.path().join("uploads"),
        output_dir: temp_dir.path().join("public/output"),
        template_dir: temp_dir.path().join("template"),
        ..Config::default()
    };
    configure(&mut config);

    std::fs::create_dir_all(&config.template_dir).expect("Failed to create template dir");
    fixtures::write_template(
        &config.template_dir.join(&config.classic_template_file),
        CLASSIC_SIZE,
    );
    fixtures::write_template(
        &config.template_dir.join(&config.detailed_template_file),
        DETAILED_SIZE,
    );

    let (state, app) = memeforge_api::initialize_app(config.clone())
        .await
        .expect("Failed to initialize app");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with an image part and the given template plus captions.
pub fn generate_form(
    image: Option<(Vec<u8>, &str, &str)>,
    template: Option<&str>,
    captions: &[(&str, &str)],
) -> MultipartForm {
    let mut form = MultipartForm::new();
    if let Some(template) = template {
        form = form.add_text("template", template.to_string());
    }
    for (name, value) in captions {
        form = form.add_text(name.to_string(), value.to_string());
    }
    if let Some((bytes, file_name, mime_type)) = image {
        let part = Part::bytes(bytes::Bytes::from(bytes))
            .file_name(file_name.to_string())
            .mime_type(mime_type.to_string());
        form = form.add_part("image", part);
    }
    form
}

/// Valid PNG upload for the classic template with a title and subtitle.
pub fn valid_form() -> MultipartForm {
    generate_form(
        Some((fixtures::png_bytes(40, 30), "photo.png", "image/png")),
        Some("phub.png"),
        &[("title", "Hello"), ("subtitle", "World")],
    )
}
