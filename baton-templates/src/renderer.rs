//! Template rendering functionality

use std::collections::HashMap;

use regex::Regex;
use tracing::warn;

/// Renders template text with `{{key}}` variable substitution
///
/// Unknown keys are left unsubstituted in the output; that is deliberate, so
/// partially-rendered templates can flow through a second rendering pass.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    placeholder: Regex,
}

impl TemplateRenderer {
    /// Create a new template renderer
    pub fn new() -> Self {
        Self {
            placeholder: Regex::new(r"\{\{\s*[\w.-]+\s*\}\}").expect("placeholder pattern is valid"),
        }
    }

    /// Render template content with the provided variables
    ///
    /// Replaces every occurrence of `{{name}}` with the variable's value.
    /// Placeholders without a matching variable stay verbatim and are only
    /// logged.
    pub fn render(&self, content: &str, variables: &HashMap<String, String>) -> String {
        let mut rendered = content.to_string();
        for (name, value) in variables {
            let placeholder = format!("{{{{{}}}}}", name);
            rendered = rendered.replace(&placeholder, value);
        }

        if let Some(unreplaced) = self.placeholder.find(&rendered) {
            warn!(
                placeholder = unreplaced.as_str(),
                "template contains unreplaced placeholders"
            );
        }

        rendered
    }

    /// Check whether content still contains placeholders after rendering
    pub fn has_placeholders(&self, content: &str) -> bool {
        self.placeholder.is_match(content)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variables(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_all_occurrences() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render(
            "fn {{name}}() { /* {{name}} body */ }",
            &variables(&[("name", "run")]),
        );
        assert_eq!(rendered, "fn run() { /* run body */ }");
        assert!(!renderer.has_placeholders(&rendered));
    }

    #[test]
    fn test_unknown_keys_left_verbatim() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render(
            "Hello {{name}}, welcome to {{project}}",
            &variables(&[("name", "Ada")]),
        );
        assert_eq!(rendered, "Hello Ada, welcome to {{project}}");
        assert!(renderer.has_placeholders(&rendered));
    }

    #[test]
    fn test_render_without_placeholders_is_identity() {
        let renderer = TemplateRenderer::new();
        let content = "plain text, no substitution";
        assert_eq!(renderer.render(content, &variables(&[])), content);
    }

    #[test]
    fn test_extra_variables_are_ignored() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render(
            "{{greeting}}!",
            &variables(&[("greeting", "Hi"), ("unused", "x")]),
        );
        assert_eq!(rendered, "Hi!");
    }
}
