use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::time::Duration;

use super::{TranslateFuture, TranslationProvider, snippet};

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// The keyless `translate_a/single` endpoint used by browser widgets.
#[derive(Debug, Clone)]
pub struct Google {
    client: reqwest::Client,
    base_url: String,
}

impl Google {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| "failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url(),
        })
    }

    async fn request(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .with_context(|| "Google Translate request failed")?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!(
                "Google Translate error ({}): {}",
                status,
                snippet(&body)
            ));
        }
        parse_gtx_response(&body)
    }
}

impl TranslationProvider for Google {
    fn name(&self) -> &'static str {
        "google"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> TranslateFuture<'a> {
        Box::pin(self.request(text, source_lang, target_lang))
    }
}

fn base_url() -> String {
    std::env::var("GOOGLE_TRANSLATE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// The payload is a nested array whose first element lists
/// `[translated, original, ...]` chunks.
pub(crate) fn parse_gtx_response(body: &str) -> Result<String> {
    let payload: Value =
        serde_json::from_str(body).with_context(|| "failed to parse Google Translate response")?;
    let chunks = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Google Translate response has no translation chunks"))?;

    let mut out = String::new();
    for chunk in chunks {
        if let Some(text) = chunk.get(0).and_then(Value::as_str) {
            out.push_str(text);
        }
    }
    if out.trim().is_empty() {
        return Err(anyhow!("Google Translate returned an empty translation"));
    }
    Ok(out)
}
