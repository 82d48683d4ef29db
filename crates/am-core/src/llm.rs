//! AI opinion adapter. Sends both raw forms to an OpenAI-compatible chat
//! endpoint and parses a SCORE/REASON reply. Any failure degrades to a
//! neutral opinion so the math score always stands on its own.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use strum::{AsRefStr, EnumString};
use thiserror::Error;
use tracing::warn;

const NEUTRAL_SCORE: u32 = 50;

static RE_SCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"SCORE:\s*(\d+)").unwrap());
static RE_REASON: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)REASON:\s*(.*)").unwrap());

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("AI endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("AI reply had no choices")]
    EmptyReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    OpenAi,
    DeepSeek,
    Mistral,
    #[strum(serialize = "xai", serialize = "grok")]
    Xai,
}

impl Provider {
    fn default_endpoint(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions",
            Provider::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
            Provider::Mistral => "https://api.mistral.ai/v1/chat/completions",
            Provider::Xai => "https://api.x.ai/v1/chat/completions",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::DeepSeek => "deepseek-chat",
            Provider::Mistral => "mistral-small-latest",
            Provider::Xai => "grok-2-latest",
        }
    }

    fn key_env_fallback(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
            Provider::Mistral => "MISTRAL_API_KEY",
            Provider::Xai => "XAI_API_KEY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub enabled: bool,
    pub provider: Provider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl AiConfig {
    pub fn from_env() -> Self {
        let enabled = std::env::var("AM_AI_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let provider = std::env::var("AM_AI_PROVIDER")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(Provider::OpenAi);
        let model = std::env::var("AM_AI_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());
        let endpoint = std::env::var("AM_AI_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| provider.default_endpoint().to_string());
        let api_key = std::env::var("AM_AI_API_KEY")
            .or_else(|_| std::env::var(provider.key_env_fallback()))
            .ok()
            .filter(|v| !v.trim().is_empty());
        let timeout_seconds = std::env::var("AM_AI_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30u64);

        Self {
            enabled,
            provider,
            model,
            endpoint,
            api_key,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

/// Second opinion on a pair, on the 0-100 scale the prompt asks for.
#[derive(Debug, Clone)]
pub struct AiOpinion {
    pub score: u32,
    pub reason: String,
    /// False when this is the neutral fallback rather than a real reply.
    pub from_model: bool,
}

impl AiOpinion {
    pub fn neutral(reason: impl Into<String>) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            reason: reason.into(),
            from_model: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

fn opinion_prompt(raw_a: &str, raw_b: &str) -> String {
    format!(
        "You are a professional matchmaker. Analyze these two profiles.\n\n\
         PROFILE 1:\n{raw_a}\n\n\
         PROFILE 2:\n{raw_b}\n\n\
         Task:\n\
         1. Ignore typos.\n\
         2. Judge vibe compatibility.\n\
         3. Look for subtle dealbreakers.\n\
         4. Provide a compatibility score (0-100).\n\
         5. Provide a 1-sentence explanation.\n\n\
         Output Format:\n\
         SCORE: [number]\n\
         REASON: [text]"
    )
}

/// Extract score and reason from a model reply. Missing pieces fall back
/// to the neutral values.
pub fn parse_opinion_reply(text: &str) -> AiOpinion {
    let score = RE_SCORE
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok())
        .map(|s| s.min(100))
        .unwrap_or(NEUTRAL_SCORE);
    let reason = RE_REASON
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "AI analysis inconclusive.".to_string());
    AiOpinion {
        score,
        reason,
        from_model: true,
    }
}

async fn call_chat_endpoint(config: &AiConfig, prompt: &str) -> Result<String, AiError> {
    let client = Client::builder().timeout(config.timeout).build()?;

    let payload = json!({
        "model": config.model,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": 0.4,
    });

    let mut request = client.post(&config.endpoint).json(&payload);
    if let Some(key) = &config.api_key {
        request = request.bearer_auth(key);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(AiError::Status {
            status,
            body: truncate(&body, 320),
        });
    }

    let body: ChatResponse = response.json().await?;
    body.choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or(AiError::EmptyReply)
}

/// Ask the configured model for an opinion on the pair. Disabled, missing
/// key, transport failure and malformed replies all come back as the
/// neutral opinion; this call never surfaces an error to scoring.
pub async fn request_opinion(config: &AiConfig, raw_a: &str, raw_b: &str) -> AiOpinion {
    if !config.enabled {
        return AiOpinion::neutral("AI opinion disabled.");
    }
    if config.api_key.is_none() {
        return AiOpinion::neutral("AI key missing, using math only.");
    }

    let prompt = opinion_prompt(raw_a, raw_b);
    match call_chat_endpoint(config, &prompt).await {
        Ok(text) => parse_opinion_reply(&text),
        Err(err) => {
            warn!(error = %err, "AI opinion unavailable, falling back to neutral");
            AiOpinion::neutral("AI unavailable, math fallback.")
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        text.to_string()
    } else {
        let mut cut = limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &text[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_reply_parses() {
        let opinion =
            parse_opinion_reply("SCORE: 82\nREASON: Shared creative energy and matching humor.");
        assert_eq!(opinion.score, 82);
        assert!(opinion.reason.starts_with("Shared creative"));
        assert!(opinion.from_model);
    }

    #[test]
    fn reply_with_preamble_still_parses() {
        let opinion = parse_opinion_reply(
            "Here is my analysis.\nSCORE: 64\nREASON: Good overlap,\nbut timezones clash.",
        );
        assert_eq!(opinion.score, 64);
        assert!(opinion.reason.contains("timezones clash"));
    }

    #[test]
    fn garbage_reply_is_neutral() {
        let opinion = parse_opinion_reply("I cannot help with that.");
        assert_eq!(opinion.score, 50);
        assert_eq!(opinion.reason, "AI analysis inconclusive.");
    }

    #[test]
    fn out_of_range_scores_clamp() {
        let opinion = parse_opinion_reply("SCORE: 500\nREASON: suspiciously perfect");
        assert_eq!(opinion.score, 100);
    }

    #[tokio::test]
    async fn disabled_config_short_circuits() {
        let config = AiConfig {
            enabled: false,
            provider: Provider::OpenAi,
            model: "gpt-4o-mini".into(),
            endpoint: "http://127.0.0.1:1".into(),
            api_key: Some("k".into()),
            timeout: Duration::from_secs(1),
        };
        let opinion = request_opinion(&config, "a", "b").await;
        assert_eq!(opinion.score, 50);
        assert!(!opinion.from_model);
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_neutral() {
        let config = AiConfig {
            enabled: true,
            provider: Provider::OpenAi,
            model: "gpt-4o-mini".into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: Some("k".into()),
            timeout: Duration::from_secs(1),
        };
        let opinion = request_opinion(&config, "a", "b").await;
        assert_eq!(opinion.score, 50);
        assert!(!opinion.from_model);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "日本語テキスト";
        let cut = truncate(text, 4);
        assert!(cut.ends_with("..."));
    }
}
