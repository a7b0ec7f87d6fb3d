//! Prompt templates for Learning Buddy.
//!
//! Prompts can be customized by placing a `rag.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for grounded FAQ answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Full instruction sent as the single user message.
    ///
    /// Placeholders: `{{platform}}`, `{{context}}`, `{{query}}`.
    pub template: String,
    /// Line format for one evidence item. Placeholders: `{{question}}`, `{{answer}}`.
    pub evidence: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are a helpful assistant. Use the following FAQ context to answer the user's query.
If the context addresses the query, answer strictly from it, as it applies to our {{platform}} website.
If the context doesn't fully address the query, check whether the query is relevant to an educational website:
   CASE 1: if the query is relevant, answer only with respect to our {{platform}} website
   CASE 2: if the query is irrelevant, humbly refuse to answer

NOTE: REFRAIN FROM USING THE NAME OF ANY OTHER EDUCATIONAL PLATFORM

FAQ Context:
{{context}}

User Query: {{query}}

Response:"#
                .to_string(),

            evidence: "Q: {{question}}\nA: {{answer}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are resolved in a single left-to-right pass over the
    /// template, so `{{...}}` sequences inside substituted values are never
    /// expanded. Unknown placeholders are left as-is.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            match after_open.find("}}") {
                Some(end) => {
                    let key = &after_open[..end];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after_open[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
