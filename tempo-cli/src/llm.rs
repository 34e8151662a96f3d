//! Minimal chat-completion client for the insight providers.
//!
//! Gemini has its own `generateContent` API; Groq and DeepSeek both speak the
//! OpenAI chat-completions dialect and share one request path.

use anyhow::Context;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    Groq,
    #[serde(rename = "deepseek")]
    #[value(name = "deepseek")]
    DeepSeek,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-1.5-flash",
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::DeepSeek => "deepseek-chat",
        }
    }

    pub fn key_env_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::Groq => "Groq",
            Provider::DeepSeek => "DeepSeek",
        }
    }

    fn openai_compatible_url(&self) -> Option<&'static str> {
        match self {
            Provider::Gemini => None,
            Provider::Groq => Some("https://api.groq.com/openai/v1/chat/completions"),
            Provider::DeepSeek => Some("https://api.deepseek.com/chat/completions"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Gemini => "gemini",
            Provider::Groq => "groq",
            Provider::DeepSeek => "deepseek",
        })
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "groq" => Ok(Provider::Groq),
            "deepseek" => Ok(Provider::DeepSeek),
            other => anyhow::bail!("unknown insights provider {other:?} (expected gemini, groq or deepseek)"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("no API key for {provider}; set {env_var} or run: tempo auth set-key {provider}")]
    MissingCredential { provider: Provider, env_var: &'static str },
    #[error("{0} rejected the API key")]
    InvalidCredential(Provider),
    #[error("{0} rate limit reached; try again later")]
    RateLimited(Provider),
    #[error("could not reach {provider}: {source}")]
    Network {
        provider: Provider,
        #[source]
        source: anyhow::Error,
    },
    #[error("unexpected response from {provider}: {detail}")]
    MalformedResponse { provider: Provider, detail: String },
    #[error("{provider} returned {status}: {body}")]
    Provider {
        provider: Provider,
        status: u16,
        body: String,
    },
}

/// Map a non-success HTTP status onto an error kind.
pub fn classify_status(provider: Provider, status: StatusCode, body: &str) -> InsightError {
    match status.as_u16() {
        401 | 403 => InsightError::InvalidCredential(provider),
        429 => InsightError::RateLimited(provider),
        // Gemini reports a bad key as 400 INVALID_ARGUMENT.
        400 if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
            InsightError::InvalidCredential(provider)
        }
        _ => InsightError::Provider {
            provider,
            status: status.as_u16(),
            body: body.chars().take(300).collect(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
    api_key: String,
}

impl LlmClient {
    pub fn new(provider: Provider, model: impl Into<String>, temperature: f32, api_key: Option<String>) -> Result<Self, InsightError> {
        let api_key = api_key.ok_or(InsightError::MissingCredential {
            provider,
            env_var: provider.key_env_var(),
        })?;
        Ok(Self {
            provider,
            model: model.into(),
            temperature,
            api_key,
        })
    }

    /// Blocking wrapper; safe to call from inside the CLI's tokio runtime.
    pub fn complete(&self, system: &str, user: &str) -> Result<String, InsightError> {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.complete_async(system, user)))
        } else {
            let rt = tokio::runtime::Runtime::new()
                .context("create tokio runtime")
                .map_err(|source| InsightError::Network {
                    provider: self.provider,
                    source,
                })?;
            rt.block_on(self.complete_async(system, user))
        }
    }

    #[instrument(skip_all, fields(provider = %self.provider, model = %self.model))]
    pub async fn complete_async(&self, system: &str, user: &str) -> Result<String, InsightError> {
        let text = match self.provider.openai_compatible_url() {
            Some(url) => self.openai_compatible(url, system, user).await?,
            None => self.gemini(system, user).await?,
        };
        if text.is_empty() {
            return Err(InsightError::MalformedResponse {
                provider: self.provider,
                detail: "empty completion".into(),
            });
        }
        debug!(chars = text.len(), "completion received");
        Ok(text)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, InsightError> {
        let resp = req.send().await.map_err(|e| InsightError::Network {
            provider: self.provider,
            source: e.into(),
        })?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(classify_status(self.provider, status, &txt));
        }
        Ok(resp)
    }

    fn malformed(&self, e: reqwest::Error) -> InsightError {
        InsightError::MalformedResponse {
            provider: self.provider,
            detail: e.to_string(),
        }
    }

    async fn openai_compatible(&self, url: &str, system: &str, user: &str) -> Result<String, InsightError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &self.model,
            messages: vec![
                Msg { role: "system", content: system },
                Msg { role: "user", content: user },
            ],
            temperature: self.temperature,
        };

        let client = reqwest::Client::new();
        let resp = self
            .send(client.post(url).bearer_auth(&self.api_key).json(&body))
            .await?;
        let out: Resp = resp.json().await.map_err(|e| self.malformed(e))?;

        Ok(out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    async fn gemini(&self, system: &str, user: &str) -> Result<String, InsightError> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            role: &'a str,
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        struct Instruction<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f32,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            system_instruction: Instruction<'a>,
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig,
        }

        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<CandidateContent>,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<PartOut>,
        }

        #[derive(Deserialize)]
        struct PartOut {
            text: Option<String>,
        }

        let body = Req {
            system_instruction: Instruction {
                parts: vec![Part { text: system }],
            },
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: user }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let client = reqwest::Client::new();
        let resp = self
            .send(client.post(url).header("x-goog-api-key", &self.api_key).json(&body))
            .await?;
        let out: Resp = resp.json().await.map_err(|e| self.malformed(e))?;

        let mut s = String::new();
        for part in out
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
        {
            if let Some(t) = part.text {
                s.push_str(&t);
            }
        }
        Ok(s.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_error_kinds() {
        assert!(matches!(
            classify_status(Provider::Groq, StatusCode::UNAUTHORIZED, ""),
            InsightError::InvalidCredential(Provider::Groq)
        ));
        assert!(matches!(
            classify_status(Provider::DeepSeek, StatusCode::TOO_MANY_REQUESTS, "slow down"),
            InsightError::RateLimited(Provider::DeepSeek)
        ));
        assert!(matches!(
            classify_status(
                Provider::Gemini,
                StatusCode::BAD_REQUEST,
                r#"{"error":{"status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#
            ),
            InsightError::InvalidCredential(Provider::Gemini)
        ));
        match classify_status(Provider::Gemini, StatusCode::SERVICE_UNAVAILABLE, "overloaded") {
            InsightError::Provider { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_key_is_a_credential_error() {
        let err = LlmClient::new(Provider::Gemini, "gemini-1.5-flash", 0.4, None).unwrap_err();
        assert!(matches!(err, InsightError::MissingCredential { env_var: "GEMINI_API_KEY", .. }));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("DeepSeek".parse::<Provider>().unwrap(), Provider::DeepSeek);
        assert_eq!(Provider::Groq.to_string(), "groq");
        assert!("openai".parse::<Provider>().is_err());
    }
}
