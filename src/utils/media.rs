//! Downloads and encodes message attachments for the generative-AI client.
//! Only the image types the chat API accepts are forwarded; an unsupported
//! type and a failed download are distinct errors so callers can report
//! each to the user accurately.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serenity::all::Attachment;
use thiserror::Error;
use tracing::debug;

/// Content types the chat API accepts as image input.
pub const SUPPORTED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Errors raised while turning an attachment into a model payload.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The attachment's content type is missing or not an accepted image type.
    #[error("unsupported attachment type: {0}")]
    Unsupported(String),

    /// The attachment could not be downloaded.
    #[error("failed to download attachment: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// An attachment ready to hand to the model.
#[derive(Debug)]
pub struct MediaPayload {
    pub mime_type: String,
    /// Base64-encoded attachment bytes.
    pub data: String,
}

pub fn supported_type(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&mime_type)
}

/// Validates an attachment's content type and downloads it into a base64
/// payload.
pub async fn fetch_attachment(attachment: &Attachment) -> Result<MediaPayload, MediaError> {
    let mime_type = attachment
        .content_type
        .as_deref()
        .ok_or_else(|| MediaError::Unsupported("unknown".to_string()))?;

    if !supported_type(mime_type) {
        return Err(MediaError::Unsupported(mime_type.to_string()));
    }

    debug!(
        "Downloading attachment '{}' ({mime_type}, {} bytes)",
        attachment.filename, attachment.size
    );
    download(&attachment.url, mime_type).await
}

async fn download(url: &str, mime_type: &str) -> Result<MediaPayload, MediaError> {
    let response = reqwest::get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(MediaPayload {
        mime_type: mime_type.to_string(),
        data: BASE64.encode(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test_case("image/png" ; "png")]
    #[test_case("image/jpeg" ; "jpeg")]
    #[test_case("image/gif" ; "gif")]
    fn accepted_image_types(mime_type: &str) {
        assert!(supported_type(mime_type));
    }

    #[test_case("application/pdf" ; "pdf")]
    #[test_case("video/mp4" ; "video")]
    #[test_case("audio/mpeg" ; "audio")]
    #[test_case("" ; "empty")]
    fn rejected_types(mime_type: &str) {
        assert!(!supported_type(mime_type));
    }

    #[tokio::test]
    async fn download_encodes_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"raw image bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = download(&format!("{}/cat.png", server.uri()), "image/png")
            .await
            .expect("download should succeed");

        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.data, BASE64.encode(b"raw image bytes"));
    }

    #[tokio::test]
    async fn download_failure_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let result = download(&format!("{}/gone.png", server.uri()), "image/png").await;

        assert_matches!(result, Err(MediaError::Fetch(_)));
    }
}
