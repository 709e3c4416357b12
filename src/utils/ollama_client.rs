//! Chat client for the Ollama generative-language API. Owns the per-channel
//! conversation sessions and turns one user prompt (plus optional image
//! payload) into one assistant response.

use ollama_rs::Ollama;
use ollama_rs::error::OllamaError;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::images::Image;
use ollama_rs::models::LocalModel;
use serenity::all::User;
use std::env;
use std::sync::{Arc, LazyLock};
use tracing::{debug, error, info, warn};

use crate::utils::database;
use crate::utils::media::MediaPayload;
use crate::utils::sessions::SessionStore;

pub type OllamaResult<T> = Result<T, OllamaError>;

/// Instructions sent as the system message of every new session, keeping
/// the model's output in the markdown shapes the segmenter and normalizer
/// expect.
const DEFAULT_SYSTEM_PROMPT: &str = "\
Keep answers tidy and easy to read in a chat client, formatted as Markdown:
- Use # for major headings and ## for subheadings.
- Use - for bullet points in lists.
- Use ** for bold text and * for italics.
- Use ``` fenced blocks for code, with a language tag (for example ```rust).
- Separate paragraphs with a blank line.";

pub struct OllamaClient {
    client: Ollama,
    default_model: Option<String>,
    sessions: SessionStore,
}

pub static OLLAMA_CLIENT: LazyLock<Arc<OllamaClient>> = LazyLock::new(|| {
    debug!("Initializing OllamaClient");
    Arc::new(OllamaClient::default())
});

fn set_default_model() -> Option<String> {
    if let Ok(model) = env::var("DEFAULT_OLLAMA_MODEL") {
        debug!("Using default model from environment variable: {}", model);
        Some(model)
    } else {
        warn!("DEFAULT_OLLAMA_MODEL environment variable not set. Using 'llama3.2'.");
        Some("llama3.2".to_string())
    }
}

fn system_prompt() -> String {
    env::var("SYSTEM_PROMPT").unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string())
}

impl OllamaClient {
    pub fn default() -> Self {
        debug!("Creating new OllamaClient instance");
        Self {
            client: Ollama::default(),
            default_model: set_default_model(),
            sessions: SessionStore::new(system_prompt()),
        }
    }

    pub fn get_default_model(&self) -> Option<String> {
        self.default_model.clone()
    }

    pub async fn list_models(&self) -> OllamaResult<Vec<LocalModel>> {
        info!("Fetching list of local models from Ollama");
        self.client.list_local_models().await
    }

    /// Sends one prompt for `channel_id`'s session and returns the
    /// assistant's text. The session history (including the new exchange)
    /// is saved back on success.
    pub async fn chat(
        &self,
        channel_id: u64,
        user: &User,
        prompt: &str,
        media: Option<MediaPayload>,
    ) -> OllamaResult<String> {
        info!(
            "Processing chat request from user {} in channel {channel_id}",
            user.name
        );
        let model = match database::get_user_model(user) {
            Some(model) => model,
            None => {
                return Err(OllamaError::Other(
                    "No model set for user or default defined".to_string(),
                ));
            }
        };
        debug!("Using model '{}' for user {}", model, user.name);

        let mut message = ChatMessage::user(prompt.to_string());
        if let Some(payload) = media {
            debug!("Attaching {} payload to chat message", payload.mime_type);
            message = message.with_images(vec![Image::from_base64(payload.data.as_str())]);
        }

        let mut history = self.sessions.get_or_create(channel_id);
        match self
            .client
            .clone()
            .send_chat_messages_with_history(
                &mut history,
                ChatMessageRequest::new(model, vec![message]),
            )
            .await
        {
            Ok(response) => {
                debug!(
                    "Received response for channel {channel_id} ({} chars)",
                    response.message.content.len()
                );
                self.sessions.store(channel_id, history);
                Ok(response.message.content)
            }
            Err(e) => {
                error!("Failed to get response for channel {channel_id}: {e}");
                Err(e)
            }
        }
    }

    /// Forgets a channel's conversation session. Returns whether one existed.
    pub fn clear_session(&self, channel_id: u64) -> bool {
        self.sessions.clear(channel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollama_rs::generation::chat::ChatMessageResponse;
    use serde_json::json;
    use serenity::model::user::User;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Deserializes a realistic User, bypassing the `#[non_exhaustive]`
    /// attribute on serenity's model type.
    fn create_test_user() -> User {
        let user_json = json!({
            "id": "123456789012345678",
            "avatar": null,
            "bot": false,
            "discriminator": "1234",
            "global_name": "TestUser",
            "username": "TestUser",
            "public_flags": null
        });
        serde_json::from_value(user_json).expect("Failed to deserialize test user from JSON")
    }

    /// Client wired to the mock server instead of a local Ollama daemon.
    fn setup_test_client(mock_server: &MockServer) -> OllamaClient {
        let parsed = url::Url::parse(&mock_server.uri()).expect("Failed to parse mock server URI");
        let host = format!(
            "{}://{}",
            parsed.scheme(),
            parsed.host_str().expect("URI has no host")
        );
        let port = parsed.port().expect("URI has no port");

        OllamaClient {
            client: Ollama::new(host, port),
            default_model: Some("test-model".to_string()),
            sessions: SessionStore::new("test system prompt"),
        }
    }

    fn chat_response_body(model: &str, content: &str) -> serde_json::Value {
        json!(ChatMessageResponse {
            model: model.to_string(),
            created_at: "2025-06-01T12:00:00Z".to_string(),
            message: ChatMessage::assistant(content.to_string()),
            done: true,
            final_data: None,
            logprobs: None,
        })
    }

    #[tokio::test]
    async fn list_models_parses_the_tag_listing() {
        let mock_server = MockServer::start().await;
        let client = setup_test_client(&mock_server);

        let body = json!({ "models": [
            { "name": "llama3:latest", "modified_at": "2025-05-01T12:00:00Z", "size": 123456789u64 },
            { "name": "mistral:latest", "modified_at": "2025-04-01T10:00:00Z", "size": 987654321u64 },
        ]});
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let models = client.list_models().await.expect("listing should succeed");

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "llama3:latest");
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn list_models_surfaces_server_errors() {
        let mock_server = MockServer::start().await;
        let client = setup_test_client(&mock_server);

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert!(client.list_models().await.is_err());
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn chat_returns_the_assistant_text_and_saves_the_session() {
        let mock_server = MockServer::start().await;
        let client = setup_test_client(&mock_server);
        let user = create_test_user();

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_response_body("test-model", "Hi there!")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let content = client
            .chat(555, &user, "Hello!", None)
            .await
            .expect("chat should succeed");
        assert_eq!(content, "Hi there!");

        // The exchange is persisted to the channel session.
        let history = client.sessions.get_or_create(555);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "test system prompt");
        assert_eq!(history[1].content, "Hello!");
        assert_eq!(history[2].content, "Hi there!");

        mock_server.verify().await;
    }

    #[tokio::test]
    async fn chat_failure_leaves_the_session_untouched() {
        let mock_server = MockServer::start().await;
        let client = setup_test_client(&mock_server);
        let user = create_test_user();

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model exploded"))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert!(client.chat(777, &user, "Hello?", None).await.is_err());

        // Only the seeded system prompt remains.
        assert_eq!(client.sessions.get_or_create(777).len(), 1);
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn sessions_do_not_leak_across_channels() {
        let mock_server = MockServer::start().await;
        let client = setup_test_client(&mock_server);
        let user = create_test_user();

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_response_body("test-model", "ok")),
            )
            .mount(&mock_server)
            .await;

        client
            .chat(1, &user, "first channel", None)
            .await
            .expect("chat should succeed");

        assert_eq!(client.sessions.get_or_create(1).len(), 3);
        assert_eq!(client.sessions.get_or_create(2).len(), 1);
    }

    #[tokio::test]
    async fn clear_session_forgets_a_channel() {
        let mock_server = MockServer::start().await;
        let client = setup_test_client(&mock_server);

        assert!(!client.clear_session(42));
        client.sessions.get_or_create(42);
        assert!(client.clear_session(42));
    }
}
