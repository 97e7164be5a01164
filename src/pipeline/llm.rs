//! Translation client: one logical "translate this text" call.
//!
//! [`Translator`] owns a [`ChatTransport`] built once at construction and a
//! [`RetryPolicy`]. Each call renders the prompts from [`crate::prompts`],
//! sends them with temperature 0.3, and retries connection-class failures.
//!
//! ## Error mapping
//!
//! | Outcome                                   | Error                                  |
//! |-------------------------------------------|----------------------------------------|
//! | every attempt failed to connect/timed out | [`TranslatorError::ConnectionExhausted`] |
//! | any other failure (HTTP status, decode)   | [`TranslatorError::TranslationFailed`]   |

use crate::config::TranslationConfig;
use crate::error::TranslatorError;
use crate::pipeline::chunk::split_into_chunks;
use crate::pipeline::retry::{RetryError, RetryPolicy};
use crate::pipeline::transport::{build_transport, ChatMessage, ChatRequest, ChatTransport};
use crate::prompts::{system_prompt, translation_prompt, TRANSLATION_TEMPERATURE};
use std::sync::Arc;
use tracing::debug;

/// Chat-completion backed translator.
///
/// Cheap to share behind an `Arc`; calls take `&self`.
pub struct Translator {
    transport: Arc<dyn ChatTransport>,
    model: String,
    source_language: String,
    target_language: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("model", &self.model)
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Translator {
    /// Build a translator with the production HTTP transport.
    ///
    /// Fails with [`TranslatorError::Configuration`] when no API key is set.
    /// A configured proxy is probed here, once.
    pub async fn new(config: &TranslationConfig) -> Result<Self, TranslatorError> {
        ensure_api_key(config)?;
        let transport = build_transport(config).await?;
        Ok(Self::with_transport(transport, config))
    }

    /// Build a translator over an existing transport.
    ///
    /// Skips the API-key check; the transport is assumed to be usable.
    pub fn with_transport(transport: Arc<dyn ChatTransport>, config: &TranslationConfig) -> Self {
        Self {
            transport,
            model: config.model.clone(),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Translate `text`, defaulting omitted languages to the configured ones.
    ///
    /// Empty or whitespace-only text is sent as is. The returned text is
    /// trimmed.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> Result<String, TranslatorError> {
        let source = source_lang.unwrap_or(&self.source_language);
        let target = target_lang.unwrap_or(&self.target_language);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt(source, target)),
                ChatMessage::user(translation_prompt(text, source, target)),
            ],
            temperature: TRANSLATION_TEMPERATURE,
        };

        debug!(
            "Translating {} chars {} → {} with {}",
            text.chars().count(),
            source,
            target,
            self.model
        );

        let transport = &self.transport;
        let request = &request;
        match self
            .retry
            .run(|_| async move { transport.complete(request).await })
            .await
        {
            Ok(content) => Ok(content.trim().to_string()),
            Err(RetryError::Exhausted { attempts, last }) => {
                Err(TranslatorError::ConnectionExhausted {
                    attempts,
                    detail: last.to_string(),
                })
            }
            Err(RetryError::Fatal { error, .. }) => Err(TranslatorError::TranslationFailed {
                message: error.to_string(),
            }),
        }
    }

    /// Translate text that may exceed `threshold` characters.
    ///
    /// The text is split into paragraph-aligned chunks and handed to
    /// [`Translator::translate_chunks`].
    pub async fn translate_long(
        &self,
        text: &str,
        threshold: usize,
    ) -> Result<String, TranslatorError> {
        let chunks = split_into_chunks(text, threshold);
        debug!("Split {} chars into {} chunks", text.chars().count(), chunks.len());
        self.translate_chunks(&chunks).await
    }

    /// Translate pre-split chunks in order with the configured languages and
    /// join the results with a blank line. The first failing chunk aborts the
    /// whole call.
    pub async fn translate_chunks(&self, chunks: &[String]) -> Result<String, TranslatorError> {
        let mut translated = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Chunk {}/{} ({} chars)", i + 1, chunks.len(), chunk.chars().count());
            translated.push(self.translate(chunk, None, None).await?);
        }
        Ok(translated.join("\n\n"))
    }
}

fn ensure_api_key(config: &TranslationConfig) -> Result<(), TranslatorError> {
    if config.api_key.trim().is_empty() {
        return Err(TranslatorError::Configuration {
            provider: config.provider.clone(),
            hint: format!(
                "Set API_KEY in the environment or in .env (API_PROVIDER={}).",
                config.provider
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Replays a script of results and records every request it sees.
    struct ScriptedTransport {
        script: Mutex<Vec<Result<String, TransportError>>>,
        seen: Mutex<Vec<ChatRequest>>,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(mut script: Vec<Result<String, TransportError>>) -> Arc<Self> {
            script.reverse();
            Arc::new(Self {
                script: Mutex::new(script),
                seen: Mutex::new(Vec::new()),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn complete(&self, request: &ChatRequest) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(TransportError::EmptyResponse))
        }
    }

    /// Echoes the source text back, tagged.
    struct EchoTransport;

    #[async_trait]
    impl ChatTransport for EchoTransport {
        async fn complete(&self, request: &ChatRequest) -> Result<String, TransportError> {
            let prompt = &request.messages[1].content;
            let start = prompt.find("Original text:\n").unwrap() + "Original text:\n".len();
            let end = prompt.rfind("\n\nTranslation:").unwrap();
            Ok(format!("<{}>", &prompt[start..end]))
        }
    }

    fn config() -> TranslationConfig {
        TranslationConfig::builder().api_key("sk-test").build().unwrap()
    }

    #[tokio::test]
    async fn missing_api_key_is_a_configuration_error() {
        let config = TranslationConfig::builder().build().unwrap();
        let err = Translator::new(&config).await.unwrap_err();
        match err {
            TranslatorError::Configuration { provider, hint } => {
                assert_eq!(provider, "deepseek");
                assert!(hint.contains("API_KEY"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_carries_prompts_model_and_temperature() {
        let transport = ScriptedTransport::new(vec![Ok("  你好\n".into())]);
        let translator = Translator::with_transport(transport.clone(), &config());
        assert_eq!(translator.model(), "deepseek-chat");

        let out = translator.translate("Hello", None, None).await.unwrap();
        assert_eq!(out, "你好");

        let seen = transport.seen.lock().unwrap();
        let req = &seen[0];
        assert_eq!(req.model, "deepseek-chat");
        assert!((req.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(req.messages[0].role, "system");
        assert!(req.messages[0].content.contains("English to Chinese"));
        assert_eq!(req.messages[1].role, "user");
        assert!(req.messages[1].content.contains("Hello"));
    }

    #[tokio::test]
    async fn explicit_languages_override_configured_ones() {
        let transport = ScriptedTransport::new(vec![Ok("Bonjour".into())]);
        let translator = Translator::with_transport(transport.clone(), &config());
        translator
            .translate("Hello", Some("English"), Some("French"))
            .await
            .unwrap();
        let seen = transport.seen.lock().unwrap();
        assert!(seen[0].messages[0].content.contains("English to French"));
    }

    #[tokio::test(start_paused = true)]
    async fn connection_failures_exhaust_after_three_attempts() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Connect("refused".into())),
            Err(TransportError::Connect("refused".into())),
            Err(TransportError::Connect("refused".into())),
        ]);
        let translator = Translator::with_transport(transport.clone(), &config());

        let err = translator.translate("Hello", None, None).await.unwrap_err();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
        match err {
            TranslatorError::ConnectionExhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_then_success() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Timeout("slow".into())),
            Ok("你好".into()),
        ]);
        let translator = Translator::with_transport(transport.clone(), &config());
        assert_eq!(translator.translate("Hello", None, None).await.unwrap(), "你好");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn http_error_fails_without_retry() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Status {
            status: 401,
            body: "invalid api key".into(),
        })]);
        let translator = Translator::with_transport(transport.clone(), &config());

        let err = translator.translate("Hello", None, None).await.unwrap_err();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        match err {
            TranslatorError::TranslationFailed { message } => {
                assert!(message.contains("401"), "got: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn custom_retry_policy_is_used() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Connect("x".into()))]);
        let translator = Translator::with_transport(transport.clone(), &config())
            .with_retry_policy(RetryPolicy::none());
        assert!(matches!(
            translator.translate("Hello", None, None).await,
            Err(TranslatorError::ConnectionExhausted { attempts: 1, .. })
        ));
    }

    #[tokio::test]
    async fn long_text_is_translated_chunk_by_chunk() {
        let translator = Translator::with_transport(Arc::new(EchoTransport), &config());
        let paragraph = "x".repeat(900);
        let text = vec![paragraph.as_str(); 5].join("\n\n");

        let out = translator.translate_long(&text, 2000).await.unwrap();
        let parts: Vec<&str> = out.split("\n\n<").collect();
        assert!(parts.len() >= 3, "got {} chunks", parts.len());
        assert!(out.starts_with('<') && out.ends_with('>'));
    }

    #[tokio::test]
    async fn long_text_failure_aborts() {
        let transport = ScriptedTransport::new(vec![
            Ok("one".into()),
            Err(TransportError::Decode("garbage".into())),
            Ok("three".into()),
        ]);
        let translator = Translator::with_transport(transport.clone(), &config());
        let text = ["a".repeat(30), "b".repeat(30), "c".repeat(30)].join("\n\n");

        let err = translator.translate_long(&text, 40).await.unwrap_err();
        assert!(matches!(err, TranslatorError::TranslationFailed { .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn pre_split_chunks_are_sent_as_given() {
        let translator = Translator::with_transport(Arc::new(EchoTransport), &config());
        let chunks = vec!["first".to_string(), "second".to_string()];

        let out = translator.translate_chunks(&chunks).await.unwrap();
        assert_eq!(out, "<first>\n\n<second>");
        assert_eq!(translator.translate_chunks(&[]).await.unwrap(), "");
    }
}
