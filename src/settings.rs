use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub source_lang: String,
    pub target_lang: String,
    pub provider: String,
    pub model: Option<String>,
    pub timeout: Duration,
    pub section_delay: Duration,
    pub per_section_quota: usize,
    pub review_section: String,
    pub storage_dir: Option<PathBuf>,
    pub folder: String,
    pub history_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_lang: "zh-CN".to_string(),
            target_lang: "ko".to_string(),
            provider: "google".to_string(),
            model: None,
            timeout: Duration::from_secs(30),
            section_delay: Duration::from_millis(1000),
            per_section_quota: 3,
            review_section: "Sheet1".to_string(),
            storage_dir: None,
            folder: "중국어 공부".to_string(),
            history_limit: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    language: Option<LanguageSettings>,
    translator: Option<TranslatorSettings>,
    review: Option<ReviewSettings>,
    storage: Option<StorageSettings>,
    system: Option<SystemSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct LanguageSettings {
    source: Option<String>,
    target: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslatorSettings {
    provider: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReviewSettings {
    section_delay_ms: Option<u64>,
    per_section_quota: Option<usize>,
    section: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSettings {
    dir: Option<String>,
    folder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SystemSettings {
    histories: Option<usize>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = paths::settings_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_toml(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed);
        Ok(())
    }

    /// Workbook root: the configured directory or the default under the
    /// base dir.
    pub fn workbook_root(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(paths::workbook_dir)
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(language) = incoming.language {
            if let Some(source) = non_empty(language.source) {
                self.source_lang = source;
            }
            if let Some(target) = non_empty(language.target) {
                self.target_lang = target;
            }
        }
        if let Some(translator) = incoming.translator {
            if let Some(provider) = non_empty(translator.provider) {
                self.provider = provider;
            }
            if let Some(model) = non_empty(translator.model) {
                self.model = Some(model);
            }
            if let Some(secs) = translator.timeout_secs {
                if secs > 0 {
                    self.timeout = Duration::from_secs(secs);
                }
            }
        }
        if let Some(review) = incoming.review {
            if let Some(delay) = review.section_delay_ms {
                self.section_delay = Duration::from_millis(delay);
            }
            if let Some(quota) = review.per_section_quota {
                if quota > 0 {
                    self.per_section_quota = quota;
                }
            }
            if let Some(section) = non_empty(review.section) {
                self.review_section = section;
            }
        }
        if let Some(storage) = incoming.storage {
            if let Some(dir) = storage.dir.as_deref().and_then(paths::normalize_dir) {
                self.storage_dir = Some(dir);
            }
            if let Some(folder) = non_empty(storage.folder) {
                self.folder = folder;
            }
        }
        if let Some(system) = incoming.system {
            if let Some(limit) = system.histories {
                if limit > 0 {
                    self.history_limit = limit;
                }
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = paths::settings_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}
