//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use freshquery_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Renders the definition's template, and its system template when present,
/// with Handlebars (HTML escaping disabled, since snippets are plain text) and
/// returns a `BuiltPrompt` ready for the generation backend.
///
/// # Example
/// ```no_run
/// use freshquery_prompt::{build_prompt, consensus_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("query".to_string(), "Who won the match?".to_string());
/// vars.insert("context".to_string(), "[Search Rank: #1 | Source: https://a.example]\n...".to_string());
/// vars.insert("currentDate".to_string(), "Monday, October 19, 2026".to_string());
///
/// let built = build_prompt(&consensus_prompt(), vars)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let rendered = render_template(&definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;

    Ok(BuiltPrompt::new(
        system,
        rendered,
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Snippets are plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::consensus_prompt;

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{query}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_no_html_escaping() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "a < b & \"c\"".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "a < b & \"c\"");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let vars = HashMap::new();
        let result = render_template("Question: {{missing}}", &vars);
        // Handlebars renders missing variables as empty string
        assert_eq!(result.unwrap(), "Question: ");
    }

    #[test]
    fn test_build_consensus_prompt() {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "Population of Lyon?".to_string());
        vars.insert("context".to_string(), "SNIPPET-BLOCK".to_string());
        vars.insert("currentDate".to_string(), "Monday, October 19, 2026".to_string());

        let built = build_prompt(&consensus_prompt(), vars).unwrap();
        assert!(built.user.contains("CURRENT SYSTEM DATE: Monday, October 19, 2026"));
        assert!(built.user.contains("closer to Monday, October 19, 2026"));
        assert!(built.user.contains("SNIPPET-BLOCK"));
        assert!(built.user.contains("USER QUESTION: Population of Lyon?"));
        assert!(built.system.is_none());
        assert_eq!(built.metadata.source_prompt_id, "freshquery.answer.consensus");
    }

    #[test]
    fn test_build_renders_system_template() {
        let definition = PromptDefinition {
            system: Some("Today is {{currentDate}}. Cite sources.".to_string()),
            template: "{{context}}\n{{query}}".to_string(),
            ..consensus_prompt()
        };

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "Fuel price?".to_string());
        vars.insert("context".to_string(), "1.89 per litre".to_string());
        vars.insert("currentDate".to_string(), "Monday, October 19, 2026".to_string());

        let built = build_prompt(&definition, vars).unwrap();
        assert_eq!(
            built.system.as_deref(),
            Some("Today is Monday, October 19, 2026. Cite sources.")
        );
        assert_eq!(built.user, "1.89 per litre\nFuel price?");
    }
}
