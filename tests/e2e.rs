//! End-to-end integration tests for gradesheet.
//!
//! The upstream correction model is simulated with wiremock, so every test
//! runs offline and deterministically. The HTTP surface is driven through
//! axum-test; exported PDFs are re-read with lopdf to check what a user
//! would actually see in the downloaded file.

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use gradesheet::server::{router, AppState};
use gradesheet::{
    build_request, correct, render_pdf, CorrectionRequest, ErrorKind, GradeError, GradingConfig,
    UploadedImage,
};
use std::collections::HashSet;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A tiny but genuine PNG, so mime sniffing has real magic bytes to read.
fn png_bytes() -> Vec<u8> {
    use image::{Rgba, RgbaImage};
    let img = RgbaImage::from_pixel(16, 16, Rgba([200, 120, 40, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode test image");
    buf
}

fn submission(image_count: usize) -> CorrectionRequest {
    CorrectionRequest {
        images: (0..image_count)
            .map(|i| UploadedImage::new(format!("page{i}.png"), "image/png", png_bytes()))
            .collect(),
        output_language: None,
        instructions: None,
    }
}

/// Config pointing the pipeline at a mocked upstream.
fn config_for(mock: &MockServer) -> GradingConfig {
    GradingConfig::builder()
        .api_key("test-key")
        .endpoint(format!("{}/api/v1", mock.uri()))
        .api_timeout_secs(5)
        .build()
        .expect("valid test config")
}

/// A well-formed chat-completions reply carrying one corrected exercise.
fn completion_body() -> serde_json::Value {
    let document = serde_json::json!({
        "exercises": [{
            "exercise_name": "Exercise 1",
            "given_data": "",
            "questions": [{
                "question": "What is 2+2?",
                "answer": "4, because addition of two twos yields four."
            }]
        }]
    });
    serde_json::json!({
        "choices": [{
            "message": { "role": "assistant", "content": document.to_string() }
        }],
        "usage": { "prompt_tokens": 1480, "completion_tokens": 230 }
    })
}

async fn mock_completions(mock: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(template)
        .mount(mock)
        .await;
}

fn test_server(config: GradingConfig) -> TestServer {
    TestServer::new(router(Arc::new(AppState { config }))).expect("test server")
}

// ── Pipeline tests against a mocked upstream ─────────────────────────────────

#[tokio::test]
async fn correct_returns_formatted_markdown_and_stats() {
    let mock = MockServer::start().await;
    mock_completions(&mock, ResponseTemplate::new(200).set_body_json(completion_body())).await;

    let correction = correct(&submission(2), &config_for(&mock))
        .await
        .expect("correction should succeed");

    assert!(correction.markdown.starts_with("## Exercise 1"));
    assert!(correction.markdown.contains("**1. What is 2+2?**"));
    assert!(correction
        .markdown
        .contains("4, because addition of two twos yields four."));
    assert_eq!(correction.document.exercises.len(), 1);
    assert_eq!(correction.stats.image_count, 2);
    assert_eq!(correction.stats.input_tokens, 1480);
    assert_eq!(correction.stats.output_tokens, 230);
}

#[tokio::test]
async fn payload_carries_credential_model_and_schema() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "google/gemini-3-flash-preview",
            "response_format": { "type": "json_schema" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .expect(1)
        .mount(&mock)
        .await;

    correct(&submission(1), &config_for(&mock))
        .await
        .expect("correction should succeed");
}

#[tokio::test]
async fn empty_submission_fails_without_touching_the_network() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .expect(0)
        .mount(&mock)
        .await;

    let err = correct(&submission(0), &config_for(&mock)).await.unwrap_err();
    assert!(matches!(err, GradeError::NoImages));
    assert_eq!(err.kind(), ErrorKind::Input);
    // expect(0) is verified when `mock` drops at the end of the test.
}

#[tokio::test]
async fn missing_credential_fails_without_touching_the_network() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .expect(0)
        .mount(&mock)
        .await;

    let mut config = config_for(&mock);
    config.api_key = None;

    let err = correct(&submission(1), &config).await.unwrap_err();
    assert!(matches!(err, GradeError::ApiKeyMissing));
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn upstream_failure_surfaces_unchanged_with_no_partial_result() {
    let mock = MockServer::start().await;
    mock_completions(
        &mock,
        ResponseTemplate::new(500).set_body_string("model exploded"),
    )
    .await;

    let result = correct(&submission(1), &config_for(&mock)).await;
    match result {
        Err(GradeError::UpstreamStatus { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("model exploded"));
        }
        other => panic!("expected UpstreamStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_upstream_is_an_upstream_error() {
    // Nothing listens on port 9 on loopback; the connection is refused.
    let config = GradingConfig::builder()
        .api_key("test-key")
        .endpoint("http://127.0.0.1:9/api/v1")
        .api_timeout_secs(5)
        .build()
        .expect("valid config");

    let err = correct(&submission(1), &config).await.unwrap_err();
    assert!(
        matches!(
            err,
            GradeError::UpstreamRequest { .. } | GradeError::UpstreamTimeout { .. }
        ),
        "got {err:?}"
    );
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn prose_instead_of_schema_json_is_malformed() {
    let mock = MockServer::start().await;
    mock_completions(
        &mock,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "I could not read the sheet." } }]
        })),
    )
    .await;

    let err = correct(&submission(1), &config_for(&mock)).await.unwrap_err();
    assert!(matches!(err, GradeError::MalformedResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn empty_choices_are_malformed() {
    let mock = MockServer::start().await;
    mock_completions(
        &mock,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
    )
    .await;

    let err = correct(&submission(1), &config_for(&mock)).await.unwrap_err();
    assert!(matches!(err, GradeError::MalformedResponse { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn fenced_json_content_is_tolerated() {
    let mock = MockServer::start().await;
    let fenced = format!(
        "```json\n{}\n```",
        serde_json::json!({ "exercises": [] })
    );
    mock_completions(
        &mock,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": fenced } }]
        })),
    )
    .await;

    let correction = correct(&submission(1), &config_for(&mock)).await.unwrap();
    assert!(correction.document.exercises.is_empty());
}

// ── Request-builder property check ───────────────────────────────────────────

#[test]
fn image_attachment_count_matches_uploads() {
    let config = GradingConfig::default();
    for count in 1..=4 {
        let chat = build_request(&submission(count), &config).expect("payload should build");
        assert_eq!(chat.image_part_count(), count);
    }
}

// ── HTTP surface tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn multipart_round_trip_against_mocked_model() {
    let mock = MockServer::start().await;
    mock_completions(&mock, ResponseTemplate::new(200).set_body_json(completion_body())).await;
    let server = test_server(config_for(&mock));

    let form = MultipartForm::new()
        .add_part(
            "image",
            Part::bytes(png_bytes())
                .file_name("sheet-1.png")
                .mime_type("image/png"),
        )
        .add_part(
            "image",
            Part::bytes(png_bytes())
                .file_name("sheet-2.png")
                .mime_type("image/png"),
        )
        .add_text("language", "English")
        .add_text("instructions", "");

    let response = server.post("/api/corrections").multipart(form).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let markdown = body["markdown"].as_str().expect("markdown field");
    assert!(markdown.contains("## Exercise 1"));
    assert_eq!(body["stats"]["image_count"], 2);
    assert_eq!(body["exercises"][0]["exercise_name"], "Exercise 1");
}

#[tokio::test]
async fn submission_without_images_is_rejected_with_400() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .expect(0)
        .mount(&mock)
        .await;
    let server = test_server(config_for(&mock));

    let form = MultipartForm::new().add_text("language", "French");
    let response = server.post("/api/corrections").multipart(form).await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap_or("").contains("image"));
}

#[tokio::test]
async fn non_image_upload_is_rejected_with_400() {
    let mock = MockServer::start().await;
    let server = test_server(config_for(&mock));

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(b"this is not an image".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = server.post("/api/corrections").multipart(form).await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap_or("").contains("notes.txt"));
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let mock = MockServer::start().await;
    mock_completions(&mock, ResponseTemplate::new(503).set_body_string("overloaded")).await;
    let server = test_server(config_for(&mock));

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(png_bytes())
            .file_name("sheet.png")
            .mime_type("image/png"),
    );
    let response = server.post("/api/corrections").multipart(form).await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap_or("").contains("503"));
}

// ── Export scenario ──────────────────────────────────────────────────────────

const SCENARIO: &str =
    "## Exercise 1\n\n**1. What is 2+2?**\n\n4, because addition of two twos yields four.\n\n---";

/// The exported PDF must contain the answer sentence as extractable text,
/// and must style the heading and the bold question with a different face
/// than the body.
#[test]
fn exported_scenario_pdf_has_answer_text_and_styled_lines() {
    let bytes = render_pdf(SCENARIO).expect("export should succeed");
    assert!(bytes.starts_with(b"%PDF"));

    let doc = lopdf::Document::load_mem(&bytes).expect("generated PDF should parse");
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1, "scenario fits one page");

    let text = doc.extract_text(&[1]).expect("text extraction");
    assert!(
        text.contains("4, because addition of two twos yields four."),
        "answer sentence missing from extracted text:\n{text}"
    );
    assert!(text.contains("Exercise 1"));

    // Font selections in the content stream: heading/question lines use the
    // bold face, the answer uses the regular one, so at least two distinct
    // (font, size) pairs must appear.
    let page_id = *pages.get(&1).expect("page 1");
    let content_bytes = doc.get_page_content(page_id).expect("page content");
    let content = lopdf::content::Content::decode(&content_bytes).expect("content ops");
    let selections: HashSet<String> = content
        .operations
        .iter()
        .filter(|op| op.operator == "Tf")
        .map(|op| format!("{:?}", op.operands))
        .collect();
    assert!(
        selections.len() >= 2,
        "expected at least two font selections, got {selections:?}"
    );
}

#[test]
fn export_of_plain_unformatted_text_degrades_gracefully() {
    let bytes = render_pdf("Just a plain sentence with no markers.").expect("export");
    let doc = lopdf::Document::load_mem(&bytes).expect("parse");
    let text = doc.extract_text(&[1]).expect("extract");
    assert!(text.contains("Just a plain sentence with no markers."));
}

#[tokio::test]
async fn pdf_export_endpoint_round_trips_the_scenario() {
    let mock = MockServer::start().await;
    let server = test_server(config_for(&mock));

    let response = server
        .post("/api/exports/pdf")
        .json(&serde_json::json!({ "markdown": SCENARIO }))
        .await;
    response.assert_status_ok();
    assert!(response.as_bytes().starts_with(b"%PDF"));

    let doc = lopdf::Document::load_mem(response.as_bytes()).expect("parse downloaded PDF");
    let text = doc.extract_text(&[1]).expect("extract");
    assert!(text.contains("4, because addition of two twos yields four."));
}
