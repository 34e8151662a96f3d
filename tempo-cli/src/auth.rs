use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::llm::Provider;
use crate::state::ensure_tempo_home;

/// Provider API keys stored in `auth.json`. Environment variables win over these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub gemini_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
}

impl AuthState {
    fn slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::Gemini => &mut self.gemini_api_key,
            Provider::Groq => &mut self.groq_api_key,
            Provider::DeepSeek => &mut self.deepseek_api_key,
        }
    }

    fn stored(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Gemini => self.gemini_api_key.as_deref(),
            Provider::Groq => self.groq_api_key.as_deref(),
            Provider::DeepSeek => self.deepseek_api_key.as_deref(),
        }
    }

    /// Resolve the key for `provider`: env var first, then the stored key.
    /// `env` is injected so callers and tests decide where variables come from.
    pub fn api_key(&self, provider: Provider, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        env(provider.key_env_var())
            .or_else(|| self.stored(provider).map(str::to_string))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

pub fn auth_path() -> Result<PathBuf> {
    Ok(ensure_tempo_home()?.join("auth.json"))
}

pub fn load_auth_from(p: &Path) -> Result<AuthState> {
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn load_auth() -> Result<AuthState> {
    load_auth_from(&auth_path()?)
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn paste_api_key(provider: Provider) -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret(&format!("Paste {} API key", provider.display_name()))?;
    if key.is_empty() {
        bail!("no key entered");
    }
    *auth.slot(provider) = Some(key);
    save_auth(&auth)?;
    println!("Saved {} API key to {}", provider.display_name(), auth_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_wins_over_stored_key() {
        let auth = AuthState {
            groq_api_key: Some("gsk_stored".into()),
            ..Default::default()
        };
        let env = |name: &str| (name == "GROQ_API_KEY").then(|| "gsk_env".to_string());
        assert_eq!(auth.api_key(Provider::Groq, env).as_deref(), Some("gsk_env"));
        assert_eq!(auth.api_key(Provider::Groq, |_| None).as_deref(), Some("gsk_stored"));
        assert_eq!(auth.api_key(Provider::Gemini, env), None);
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let auth = AuthState {
            deepseek_api_key: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(auth.api_key(Provider::DeepSeek, |_| None), None);
    }

    #[test]
    fn missing_auth_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_auth_from(&dir.path().join("auth.json")).unwrap(), AuthState::default());
    }
}
