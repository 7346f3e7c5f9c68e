use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Value, json};
use tera::{Context as TeraContext, Tera};

use crate::providers::AUTO_DETECT;

pub const TOOL_NAME: &str = "deliver_translation";

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("prompts/system_prompt.tera");

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

pub fn tool_spec(tool_name: &str) -> ToolSpec {
    ToolSpec {
        name: tool_name.to_string(),
        description: "Return the translation of the study text.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "translation": {"type": "string"},
                "source_language": {"type": "string"}
            },
            "required": ["translation"]
        }),
    }
}

pub fn render_system_prompt(
    source_lang: &str,
    target_lang: &str,
    tool_name: &str,
) -> Result<String> {
    let mut context = TeraContext::new();
    context.insert("source_lang", &describe_source(source_lang));
    context.insert("target_lang", target_lang.trim());
    context.insert("tool_name", tool_name);
    Tera::one_off(SYSTEM_PROMPT_TEMPLATE, &context, false)
        .with_context(|| "failed to render system prompt")
}

#[derive(Debug, Deserialize)]
struct ToolArgs {
    translation: String,
}

pub fn parse_tool_args(value: Value) -> Result<String> {
    let args: ToolArgs =
        serde_json::from_value(value).with_context(|| "failed to parse translation tool args")?;
    let translation = args.translation.trim();
    if translation.is_empty() {
        return Err(anyhow!("translation is empty"));
    }
    Ok(translation.to_string())
}

fn describe_source(source_lang: &str) -> String {
    let code = source_lang.trim();
    if code.eq_ignore_ascii_case(AUTO_DETECT) {
        "auto-detected".to_string()
    } else {
        code.to_string()
    }
}
