//! Configuration types for translation and for the HTTP service.
//!
//! [`TranslationConfig`] is resolved once at process start, from the
//! environment or through its builder, and then passed by reference to every
//! component that needs it. Nothing below the binary reads environment
//! variables on its own.
//!
//! Provider-specific defaults live in a single lookup table,
//! [`PROVIDERS`]. Adding a provider means adding one row.

use crate::error::TranslatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default number of characters above which a page is split into chunks.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Default per-attempt request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upload size cap: 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Default values attached to a provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    /// Lower-case identifier, as given in `API_PROVIDER`.
    pub id: &'static str,
    /// Model used when `MODEL` is not set.
    pub model: &'static str,
    /// Base URL used when `BASE_URL` is not set.
    pub base_url: &'static str,
}

/// Known providers. The last row doubles as the fallback for unknown ids.
pub const PROVIDERS: &[ProviderDefaults] = &[
    ProviderDefaults {
        id: "deepseek",
        model: "deepseek-chat",
        base_url: "https://api.deepseek.com",
    },
    ProviderDefaults {
        id: "openai",
        model: "gpt-3.5-turbo",
        base_url: "https://api.openai.com/v1",
    },
];

/// Provider used when `API_PROVIDER` is not set.
pub const DEFAULT_PROVIDER: &str = "deepseek";

/// Look up the defaults for `provider` (case-insensitive).
///
/// Unknown providers are treated as generic OpenAI-compatible endpoints.
pub fn provider_defaults(provider: &str) -> &'static ProviderDefaults {
    let id = provider.trim().to_ascii_lowercase();
    PROVIDERS
        .iter()
        .find(|p| p.id == id)
        .unwrap_or(&PROVIDERS[PROVIDERS.len() - 1])
}

/// Everything the translation client needs to talk to the chat API.
#[derive(Clone, PartialEq, Eq)]
pub struct TranslationConfig {
    /// Provider identifier, lower-case. Default: `deepseek`.
    pub provider: String,

    /// API key sent as a bearer token. Must be non-empty to build a translator.
    pub api_key: String,

    /// Chat model name. Default: the provider's model.
    pub model: String,

    /// Explicit base URL. When `None`, the provider's base URL is used.
    pub base_url: Option<String>,

    /// HTTP proxy URL, e.g. `http://127.0.0.1:7890`. Probed once before use.
    pub proxy: Option<String>,

    /// Per-attempt request timeout in seconds. Default: 60.
    pub timeout_secs: u64,

    /// Language label used in prompts when the caller gives none.
    pub source_language: String,

    /// Language label used in prompts when the caller gives none.
    pub target_language: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let defaults = provider_defaults(DEFAULT_PROVIDER);
        Self {
            provider: defaults.id.to_string(),
            api_key: String::new(),
            model: defaults.model.to_string(),
            base_url: None,
            proxy: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            source_language: "English".to_string(),
            target_language: "Chinese".to_string(),
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("provider", &self.provider)
            .field("api_key", &mask_key(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .field("timeout_secs", &self.timeout_secs)
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
            model_set: false,
        }
    }

    /// Resolve the configuration from process environment variables.
    pub fn from_env() -> Result<Self, TranslatorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset. Each primary variable has a legacy
    /// `OPENAI_*` fallback.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TranslatorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|k| lookup(*k))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        let provider = get(&["API_PROVIDER"])
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
            .to_ascii_lowercase();
        let defaults = provider_defaults(&provider);

        let timeout_secs = match get(&["TIMEOUT", "OPENAI_TIMEOUT"]) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                TranslatorError::InvalidConfig(format!(
                    "TIMEOUT must be a whole number of seconds, got '{raw}'"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let base = Self::default();
        Ok(Self {
            api_key: get(&["API_KEY", "OPENAI_API_KEY"]).unwrap_or_default(),
            model: get(&["MODEL", "OPENAI_MODEL"]).unwrap_or_else(|| defaults.model.to_string()),
            base_url: get(&["BASE_URL", "OPENAI_BASE_URL"]),
            proxy: get(&["PROXY", "OPENAI_PROXY"]),
            timeout_secs,
            source_language: get(&["SOURCE_LANGUAGE"]).unwrap_or(base.source_language),
            target_language: get(&["TARGET_LANGUAGE"]).unwrap_or(base.target_language),
            provider,
        })
    }

    /// Base URL actually used for requests.
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(provider_defaults(&self.provider).base_url)
    }

    /// Full chat-completions endpoint URL.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.effective_base_url().trim_end_matches('/')
        )
    }

    /// The API key with all but its edges hidden, for logs and diagnostics.
    pub fn masked_api_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        "<unset>".to_string()
    } else if chars.len() > 14 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

/// Builder for [`TranslationConfig`].
#[derive(Debug)]
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
    model_set: bool,
}

impl TranslationConfigBuilder {
    /// Select a provider; its default model applies unless [`Self::model`] is called.
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.config.provider = provider.into().to_ascii_lowercase();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self.model_set = true;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.config.proxy = Some(url.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn source_language(mut self, lang: impl Into<String>) -> Self {
        self.config.source_language = lang.into();
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.config.target_language = lang.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<TranslationConfig, TranslatorError> {
        if !self.model_set {
            self.config.model = provider_defaults(&self.config.provider).model.to_string();
        }
        if self.config.timeout_secs == 0 {
            return Err(TranslatorError::InvalidConfig(
                "Timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Server configuration ─────────────────────────────────────────────────

/// Settings of the HTTP service that are unrelated to translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to listen on. Default: `0.0.0.0:5000`.
    pub bind: SocketAddr,

    /// Directory uploaded PDFs are stored in. Created on startup.
    pub upload_dir: PathBuf,

    /// Maximum accepted request body size in bytes. Default: 16 MiB.
    pub max_upload_bytes: usize,

    /// Optional directory holding a built frontend, served at `/`.
    pub static_dir: Option<PathBuf>,

    /// Optional explicit path to the pdfium shared library.
    pub pdfium_library_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            static_dir: None,
            pdfium_library_path: None,
        }
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// Which extracted pages to translate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page (default).
    #[default]
    All,
    /// Only pages whose 1-based number is listed. Unknown numbers are ignored.
    Set(Vec<u32>),
}

impl PageSelection {
    /// An absent or empty list selects every page.
    pub fn from_numbers(numbers: Option<Vec<u32>>) -> Self {
        match numbers {
            Some(n) if !n.is_empty() => PageSelection::Set(n),
            _ => PageSelection::All,
        }
    }

    /// Whether `page` (1-based) is selected.
    pub fn contains(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Set(pages) => pages.contains(&page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_select_deepseek() {
        let c = TranslationConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c.provider, "deepseek");
        assert_eq!(c.model, "deepseek-chat");
        assert_eq!(c.effective_base_url(), "https://api.deepseek.com");
        assert_eq!(c.timeout_secs, 60);
        assert!(c.api_key.is_empty());
        assert_eq!(c.proxy, None);
    }

    #[test]
    fn openai_provider_uses_its_own_defaults() {
        let c = TranslationConfig::from_lookup(lookup(&[("API_PROVIDER", "OpenAI")])).unwrap();
        assert_eq!(c.provider, "openai");
        assert_eq!(c.model, "gpt-3.5-turbo");
        assert_eq!(
            c.chat_completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn unknown_provider_falls_back_to_generic_defaults() {
        let d = provider_defaults("some-gateway");
        assert_eq!(d.id, "openai");
    }

    #[test]
    fn legacy_variables_are_fallbacks() {
        let c = TranslationConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-legacy"),
            ("OPENAI_PROXY", "http://127.0.0.1:7890"),
            ("OPENAI_TIMEOUT", "120"),
        ]))
        .unwrap();
        assert_eq!(c.api_key, "sk-legacy");
        assert_eq!(c.proxy.as_deref(), Some("http://127.0.0.1:7890"));
        assert_eq!(c.timeout_secs, 120);

        let c = TranslationConfig::from_lookup(lookup(&[
            ("API_KEY", "sk-new"),
            ("OPENAI_API_KEY", "sk-legacy"),
        ]))
        .unwrap();
        assert_eq!(c.api_key, "sk-new");
    }

    #[test]
    fn explicit_values_override_provider_defaults() {
        let c = TranslationConfig::from_lookup(lookup(&[
            ("MODEL", "deepseek-reasoner"),
            ("BASE_URL", "https://gateway.example.com/"),
            ("SOURCE_LANGUAGE", "German"),
            ("TARGET_LANGUAGE", "French"),
        ]))
        .unwrap();
        assert_eq!(c.model, "deepseek-reasoner");
        assert_eq!(
            c.chat_completions_url(),
            "https://gateway.example.com/chat/completions"
        );
        assert_eq!(c.source_language, "German");
        assert_eq!(c.target_language, "French");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let c = TranslationConfig::from_lookup(lookup(&[("MODEL", "  "), ("PROXY", "")])).unwrap();
        assert_eq!(c.model, "deepseek-chat");
        assert_eq!(c.proxy, None);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = TranslationConfig::from_lookup(lookup(&[("TIMEOUT", "soon")])).unwrap_err();
        assert!(matches!(err, TranslatorError::InvalidConfig(_)));
    }

    #[test]
    fn builder_applies_provider_model_unless_overridden() {
        let c = TranslationConfig::builder()
            .provider("openai")
            .api_key("sk-test")
            .build()
            .unwrap();
        assert_eq!(c.model, "gpt-3.5-turbo");

        let c = TranslationConfig::builder()
            .provider("openai")
            .model("gpt-4o-mini")
            .build()
            .unwrap();
        assert_eq!(c.model, "gpt-4o-mini");

        assert!(TranslationConfig::builder().timeout_secs(0).build().is_err());
    }

    #[test]
    fn debug_output_masks_key() {
        let c = TranslationConfig::builder()
            .api_key("sk-0123456789abcdefWXYZ")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("0123456789abcdefWXYZ"));
        assert!(dbg.contains("sk-0123456...WXYZ"));
        assert_eq!(
            TranslationConfig::default().masked_api_key(),
            "<unset>"
        );
    }

    #[test]
    fn page_selection_from_numbers() {
        assert_eq!(PageSelection::from_numbers(None), PageSelection::All);
        assert_eq!(PageSelection::from_numbers(Some(vec![])), PageSelection::All);
        let s = PageSelection::from_numbers(Some(vec![2]));
        assert!(s.contains(2));
        assert!(!s.contains(1));
        assert!(PageSelection::All.contains(99));
    }
}
