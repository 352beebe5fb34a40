//! Decode-once codec for the HTTP ingest path.
//!
//! - Query string pairs come first, then body fields
//! - `application/x-www-form-urlencoded` (or no content type) bodies are read as a form
//! - `multipart/form-data` text fields are read in arrival order; file parts are skipped
//! - Other bodies are ignored
//! - Repeated keys are preserved (see [`Params`])

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header,
};

use mcstats_core::error::{RelayError, Result};
use mcstats_core::Params;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Decode query string and body of an ingest request.
pub async fn decode_request(req: Request) -> Result<Params> {
    let query = req.uri().query().map(str::to_owned);
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    if mime_is(content_type.as_deref(), MULTIPART_CONTENT_TYPE) {
        let mut params = decode_params(query.as_deref(), None, &[])?;
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| RelayError::BadRequest(format!("invalid multipart body: {e}")))?;
        decode_multipart(multipart, &mut params).await?;
        return Ok(params);
    }

    let body = Bytes::from_request(req, &())
        .await
        .map_err(|e| RelayError::BadRequest(format!("read body failed: {e}")))?;
    decode_params(query.as_deref(), content_type.as_deref(), &body)
}

async fn decode_multipart(mut multipart: Multipart, params: &mut Params) -> Result<()> {
    let bad = |e: axum::extract::multipart::MultipartError| {
        RelayError::BadRequest(format!("invalid multipart body: {e}"))
    };

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if field.file_name().is_some() {
            tracing::debug!(field = %name, "skipping multipart file part");
            continue;
        }
        let value = field.text().await.map_err(bad)?;
        params.push(name, value);
    }
    Ok(())
}

pub fn decode_params(query: Option<&str>, content_type: Option<&str>, body: &[u8]) -> Result<Params> {
    let mut params = Params::new();

    if let Some(q) = query {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(q)
            .map_err(|e| RelayError::BadRequest(format!("invalid query string: {e}")))?;
        params.extend(pairs);
    }

    if !body.is_empty() && is_form(content_type) {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| RelayError::BadRequest(format!("invalid form body: {e}")))?;
        params.extend(pairs);
    }

    Ok(params)
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type.is_none() || mime_is(content_type, FORM_CONTENT_TYPE)
}

fn mime_is(content_type: Option<&str>, expected: &str) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_then_body() {
        let p = decode_params(Some("t=c&s=kills"), Some(FORM_CONTENT_TYPE), b"v=1&_player=alice").unwrap();
        let keys: Vec<&str> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["t", "s", "v", "_player"]);
        assert_eq!(p.get("_player"), Some("alice"));
    }

    #[test]
    fn percent_decoding() {
        let p = decode_params(None, None, b"s=chunk%2Eload&_host%3Aname=a+b").unwrap();
        assert_eq!(p.get("s"), Some("chunk.load"));
        assert_eq!(p.get("_host:name"), Some("a b"));
    }

    #[test]
    fn charset_parameter_accepted() {
        let ct = "application/x-www-form-urlencoded; charset=utf-8";
        let p = decode_params(None, Some(ct), b"t=g").unwrap();
        assert_eq!(p.get("t"), Some("g"));
    }

    #[tokio::test]
    async fn multipart_fields_in_order() {
        let body = "--XB\r\n\
            Content-Disposition: form-data; name=\"s\"\r\n\r\nkills\r\n\
            --XB\r\n\
            Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\
            Content-Type: text/plain\r\n\r\nignored\r\n\
            --XB\r\n\
            Content-Disposition: form-data; name=\"_player\"\r\n\r\nalice\r\n\
            --XB--\r\n";
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/?t=c")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XB")
            .body(axum::body::Body::from(body))
            .unwrap();

        let p = decode_request(req).await.unwrap();
        let keys: Vec<&str> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["t", "s", "_player"]);
        assert_eq!(p.get("s"), Some("kills"));
        assert_eq!(p.get("upload"), None);
    }

    #[tokio::test]
    async fn malformed_multipart_rejected() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "multipart/form-data")
            .body(axum::body::Body::from("t=c"))
            .unwrap();

        let err = decode_request(req).await.unwrap_err();
        assert_eq!(err.client_code().http_status(), 400);
    }

    #[test]
    fn non_form_body_ignored() {
        let p = decode_params(Some("t=c"), Some("application/json"), br#"{"t":"g"}"#).unwrap();
        assert_eq!(p.get("t"), Some("c"));
        assert_eq!(p.len(), 1);
    }
}
