use super::*;

#[test]
fn request_body_uses_camel_case() {
    let body = PreviewRequest {
        owner: "octo",
        repo: "site",
        file_path: "frontend",
    };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"owner": "octo", "repo": "site", "filePath": "frontend"})
    );
}

#[test]
fn response_yields_preview_url() {
    assert_eq!(
        parse_preview_response(r#"{"previewUrl":"/preview/octo-site"}"#),
        Ok("/preview/octo-site".to_string())
    );
}

#[test]
fn response_without_url_is_invalid() {
    assert!(matches!(
        parse_preview_response(r#"{"status":"building"}"#),
        Err(PreviewError::InvalidResponse(_))
    ));
    assert!(matches!(
        parse_preview_response("<html>"),
        Err(PreviewError::InvalidResponse(_))
    ));
}
