use anyhow::{Result, anyhow};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

mod google;
mod openai;

pub use google::Google;
pub use openai::OpenAI;

/// Locale code that asks the backend to detect the source language.
pub const AUTO_DETECT: &str = "auto";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::OpenAI => "openai",
        }
    }
}

pub type TranslateFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// A machine translation backend. One call, one attempt: fallback policy
/// lives in [`crate::Translator`].
pub trait TranslationProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> TranslateFuture<'a>;
}

#[derive(Debug, Clone)]
pub enum ProviderImpl {
    Google(Google),
    OpenAI(OpenAI),
}

impl TranslationProvider for ProviderImpl {
    fn name(&self) -> &'static str {
        match self {
            ProviderImpl::Google(provider) => provider.name(),
            ProviderImpl::OpenAI(provider) => provider.name(),
        }
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> TranslateFuture<'a> {
        match self {
            ProviderImpl::Google(provider) => provider.translate(text, source_lang, target_lang),
            ProviderImpl::OpenAI(provider) => provider.translate(text, source_lang, target_lang),
        }
    }
}

pub fn build_provider(
    kind: ProviderKind,
    key: Option<String>,
    model: Option<String>,
    timeout: Duration,
) -> Result<ProviderImpl> {
    match kind {
        ProviderKind::Google => Ok(ProviderImpl::Google(Google::new(timeout)?)),
        ProviderKind::OpenAI => {
            let key = resolve_key(kind, key.as_deref())?;
            let mut provider = OpenAI::new(key, timeout)?;
            if let Some(model) = model {
                provider = provider.with_model(model);
            }
            Ok(ProviderImpl::OpenAI(provider))
        }
    }
}

pub fn provider_from_name(name: &str) -> Result<ProviderKind> {
    match name.trim().to_lowercase().as_str() {
        "google" | "gtx" => Ok(ProviderKind::Google),
        "openai" => Ok(ProviderKind::OpenAI),
        other => Err(anyhow!(
            "unknown translation provider '{}' (expected google or openai)",
            other
        )),
    }
}

pub fn resolve_key(provider: ProviderKind, override_key: Option<&str>) -> Result<String> {
    if let Some(key) = override_key.filter(|key| !key.trim().is_empty()) {
        return Ok(key.to_string());
    }
    match provider {
        ProviderKind::Google => Ok(String::new()),
        ProviderKind::OpenAI => {
            get_env("OPENAI_API_KEY").ok_or_else(|| anyhow!("OPENAI_API_KEY is not set"))
        }
    }
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > 200 {
        let head: String = trimmed.chars().take(200).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}
