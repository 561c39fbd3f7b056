use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::config::PromptConfig;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{(asset|a1|a2|category)\}").expect("placeholder pattern is valid")
    })
}

/// Single pass over the template, so substituted values are never rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

/// Fills the configured templates for requests that name assets instead of
/// carrying a ready-made prompt.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    scan_template: String,
    compare_template: String,
}

impl PromptBuilder {
    pub fn new(config: &PromptConfig) -> Self {
        Self {
            scan_template: config.scan_template.clone(),
            compare_template: config.compare_template.clone(),
        }
    }

    pub fn scan(&self, asset: &str, category: &str) -> String {
        fill(&self.scan_template, &[("asset", asset), ("category", category)])
    }

    pub fn compare(&self, a1: &str, a2: &str, category: &str) -> String {
        fill(
            &self.compare_template,
            &[("a1", a1), ("a2", a2), ("category", category)],
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(&PromptConfig::default())
    }
}
