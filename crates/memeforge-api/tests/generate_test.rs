//! Generate endpoint integration tests.
//!
//! Run with: `cargo test -p memeforge-api --test generate_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{fixtures, generate_form, setup_test_app, setup_test_app_with, valid_form};
use image::GenericImageView;
use memeforge_core::models::GenerationResponse;

#[tokio::test]
async fn test_generate_returns_urls_and_writes_png() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.post("/generate").multipart(valid_form()).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: GenerationResponse = response.json();
    assert!(body.success);
    let filename = body
        .image_url
        .strip_prefix("/output/")
        .expect("imageUrl under /output/");
    assert_eq!(body.download_url, format!("/download/{}", filename));
    assert!(filename.ends_with(".png"));

    let written = app.config.output_dir.join(filename);
    let img = image::open(&written).expect("output is a decodable image");
    assert_eq!(img.dimensions(), helpers::CLASSIC_SIZE);

    // The upload is removed once the output exists
    let leftover = std::fs::read_dir(&app.config.upload_dir).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_generate_detailed_template_dimensions() {
    let app = setup_test_app().await;

    let form = generate_form(
        Some((fixtures::png_bytes(64, 64), "clip.gif.png", "image/png")),
        Some("xnxx.png"),
        &[
            ("title", "Hello"),
            ("subtitle", "World"),
            ("subtitle2", "1.2M views"),
            ("subtitle3", "10:00"),
        ],
    );
    let response = app.client().post("/generate").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: GenerationResponse = response.json();
    let output = app.client().get(&body.image_url).await;
    assert_eq!(output.status_code(), StatusCode::OK);
    let img = image::load_from_memory(output.as_bytes()).unwrap();
    assert_eq!(img.dimensions(), helpers::DETAILED_SIZE);
}

#[tokio::test]
async fn test_second_generate_within_cooldown_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let first = client.post("/generate").multipart(valid_form()).await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = client.post("/generate").multipart(valid_form()).await;
    assert_eq!(second.status_code(), StatusCode::TOO_MANY_REQUESTS);

    let body: serde_json::Value = second.json();
    assert_eq!(body["code"], "COOLDOWN_ACTIVE");
    let message = body["error"].as_str().unwrap();
    let seconds: u64 = message
        .strip_prefix("Please wait ")
        .and_then(|rest| rest.split(' ').next())
        .and_then(|n| n.parse().ok())
        .expect("countdown in message");
    assert!((1..=30).contains(&seconds), "countdown {seconds} out of range");

    let retry_after: u64 = second.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(retry_after, seconds);
}

#[tokio::test]
async fn test_cooldown_is_per_client() {
    let app = setup_test_app().await;
    let client = app.client();

    let first = client
        .post("/generate")
        .add_header("X-Forwarded-For", "203.0.113.1")
        .multipart(valid_form())
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let other = client
        .post("/generate")
        .add_header("X-Forwarded-For", "203.0.113.2")
        .multipart(valid_form())
        .await;
    assert_eq!(other.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_forged_forwarded_prefix_does_not_reset_cooldown() {
    let app = setup_test_app().await;
    let client = app.client();

    let first = client
        .post("/generate")
        .add_header("X-Forwarded-For", "6.6.6.1, 203.0.113.9")
        .multipart(valid_form())
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = client
        .post("/generate")
        .add_header("X-Forwarded-For", "6.6.6.2, 203.0.113.9")
        .multipart(valid_form())
        .await;
    assert_eq!(second.status_code(), StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = second.json();
    assert_eq!(body["code"], "COOLDOWN_ACTIVE");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_generates_from_one_client_admit_one() {
    let app = setup_test_app().await;
    let client = app.client();

    let (a, b) = tokio::join!(
        async { client.post("/generate").multipart(valid_form()).await },
        async { client.post("/generate").multipart(valid_form()).await },
    );

    let mut statuses = [a.status_code(), b.status_code()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]);

    let outputs = std::fs::read_dir(&app.config.output_dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "png"))
        .count();
    assert_eq!(outputs, 1);
}

#[tokio::test]
async fn test_failed_generation_does_not_start_cooldown() {
    let app = setup_test_app().await;
    let client = app.client();

    let bad = client
        .post("/generate")
        .multipart(generate_form(None, Some("phub.png"), &[]))
        .await;
    assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);

    let good = client.post("/generate").multipart(valid_form()).await;
    assert_eq!(good.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_template_rejected() {
    let app = setup_test_app().await;

    let form = generate_form(
        Some((fixtures::png_bytes(8, 8), "photo.png", "image/png")),
        Some("unknown.png"),
        &[],
    );
    let response = app.client().post("/generate").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid template selected");
    assert_eq!(body["code"], "INVALID_TEMPLATE");
}

#[tokio::test]
async fn test_missing_template_rejected() {
    let app = setup_test_app().await;

    let form = generate_form(
        Some((fixtures::png_bytes(8, 8), "photo.png", "image/png")),
        None,
        &[],
    );
    let response = app.client().post("/generate").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_image_rejected() {
    let app = setup_test_app().await;

    let form = generate_form(None, Some("unknown.png"), &[("title", "x")]);
    let response = app.client().post("/generate").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Image presence is checked before the template
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No image uploaded");
}

#[tokio::test]
async fn test_disallowed_extension_rejected_regardless_of_content_type() {
    let app = setup_test_app().await;

    for file_name in ["photo.bmp", "photo.webp", "photo", "photo.png.exe"] {
        let form = generate_form(
            Some((fixtures::png_bytes(8, 8), file_name, "image/png")),
            Some("phub.png"),
            &[],
        );
        let response = app.client().post("/generate").multipart(form).await;
        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "{file_name} should be rejected"
        );
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Only image files are allowed!");
    }
}

#[tokio::test]
async fn test_non_image_content_type_rejected() {
    let app = setup_test_app().await;

    let form = generate_form(
        Some((fixtures::png_bytes(8, 8), "photo.png", "application/pdf")),
        Some("phub.png"),
        &[],
    );
    let response = app.client().post("/generate").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid file type!");
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let app = setup_test_app_with(|config| config.max_upload_bytes = 1024).await;

    let form = generate_form(
        Some((vec![0u8; 4096], "big.png", "image/png")),
        Some("phub.png"),
        &[],
    );
    let response = app.client().post("/generate").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

    let leftover = std::fs::read_dir(&app.config.upload_dir).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_undecodable_upload_is_server_error() {
    let app = setup_test_app().await;

    let form = generate_form(
        Some((b"definitely not an image".to_vec(), "photo.png", "image/png")),
        Some("phub.png"),
        &[],
    );
    let response = app.client().post("/generate").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Error generating image");

    let leftover = std::fs::read_dir(&app.config.upload_dir).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_generate_rate_limit_headers_and_rejection() {
    let app = setup_test_app_with(|config| config.generate_rate_limit_per_hour = 2).await;
    let client = app.client();

    // Rejected requests still count against the hourly limit
    for expected_remaining in ["1", "0"] {
        let response = client
            .post("/generate")
            .multipart(generate_form(None, Some("phub.png"), &[]))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["ratelimit-limit"], "2");
        assert_eq!(response.headers()["ratelimit-remaining"], expected_remaining);
        assert!(response.headers().contains_key("ratelimit-reset"));
    }

    let limited = client
        .post("/generate")
        .multipart(generate_form(None, Some("phub.png"), &[]))
        .await;
    assert_eq!(limited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));
    assert!(!limited.headers().contains_key("x-ratelimit-limit"));

    let body: serde_json::Value = limited.json();
    assert_eq!(body["code"], "RATE_LIMITED");
    assert_eq!(
        body["error"],
        "Too many generate requests, please try again later."
    );
}
