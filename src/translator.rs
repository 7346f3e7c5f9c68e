use tracing::{debug, warn};

use crate::providers::{AUTO_DETECT, TranslationProvider};

/// How a translation was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Primary(String),
    Fallback(String),
    Unavailable,
}

impl Resolution {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Resolution::Unavailable)
    }

    pub fn into_text(self) -> String {
        match self {
            Resolution::Primary(text) | Resolution::Fallback(text) => text,
            Resolution::Unavailable => String::new(),
        }
    }
}

enum Step {
    Primary,
    Fallback,
    SoftFail(anyhow::Error),
}

/// Translates with a fixed source locale, falls back once to
/// auto-detection, and otherwise yields an empty translation.
#[derive(Debug, Clone)]
pub struct Translator<P: TranslationProvider> {
    provider: P,
    source_lang: String,
    target_lang: String,
}

impl<P: TranslationProvider> Translator<P> {
    pub fn new(
        provider: P,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn translate(&self, text: &str) -> String {
        self.resolve(text).await.into_text()
    }

    pub async fn resolve(&self, text: &str) -> Resolution {
        let mut step = Step::Primary;
        loop {
            step = match step {
                Step::Primary => {
                    match self
                        .provider
                        .translate(text, &self.source_lang, &self.target_lang)
                        .await
                    {
                        Ok(translated) => return Resolution::Primary(translated),
                        Err(err) => {
                            debug!(
                                "{} failed with source '{}': {:#}; retrying with auto-detect",
                                self.provider.name(),
                                self.source_lang,
                                err
                            );
                            Step::Fallback
                        }
                    }
                }
                Step::Fallback => {
                    match self
                        .provider
                        .translate(text, AUTO_DETECT, &self.target_lang)
                        .await
                    {
                        Ok(translated) => return Resolution::Fallback(translated),
                        Err(err) => Step::SoftFail(err),
                    }
                }
                Step::SoftFail(err) => {
                    warn!("translation failed for '{}': {:#}", text, err);
                    return Resolution::Unavailable;
                }
            };
        }
    }
}
