//! Prompt loader for YAML prompt definitions and the built-in fallback.

use crate::defaults::{consensus_prompt, CONSENSUS_PROMPT_ID};
use crate::types::PromptDefinition;
use freshquery_core::{AppError, AppResult};
use std::path::Path;

/// Template variables every answering prompt must reference.
const REQUIRED_VARIABLES: [&str; 2] = ["query", "context"];

/// Resolve the prompt definition to use for answering.
///
/// Lookup order:
/// 1. `prompt_file`, when given
/// 2. `<prompts_dir>/<prompt_id>.yml`, when it exists
/// 3. the built-in definition, when `prompt_id` names it
///
/// # Example
/// ```no_run
/// use freshquery_prompt::{resolve_prompt, CONSENSUS_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = resolve_prompt(Path::new(".freshquery/prompts"), CONSENSUS_PROMPT_ID, None)?;
/// println!("Using prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn resolve_prompt(
    prompts_dir: &Path,
    prompt_id: &str,
    prompt_file: Option<&Path>,
) -> AppResult<PromptDefinition> {
    if let Some(file) = prompt_file {
        return load_prompt_file(file);
    }

    if prompts_dir.join(format!("{}.yml", prompt_id)).exists() {
        return load_prompt(prompts_dir, prompt_id);
    }

    if prompt_id == CONSENSUS_PROMPT_ID {
        tracing::debug!("Using built-in prompt: {}", prompt_id);
        return Ok(consensus_prompt());
    }

    Err(AppError::Prompt(format!(
        "Prompt '{}' not found in {:?} and is not built in",
        prompt_id, prompts_dir
    )))
}

/// Load a prompt definition by ID from a prompts directory.
///
/// Looks for a file named `<id>.yml` in `prompts_dir`.
pub fn load_prompt(prompts_dir: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir.join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    load_prompt_file(&prompt_file)
}

/// Load and validate a prompt definition from an explicit file.
pub fn load_prompt_file(prompt_file: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {:?}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    for variable in REQUIRED_VARIABLES {
        if !references_variable(&def.template, variable) {
            return Err(AppError::Prompt(format!(
                "Prompt template must reference '{{{{{}}}}}'",
                variable
            )));
        }
    }

    Ok(())
}

/// Whether a Handlebars template contains a `{{name}}` expression.
fn references_variable(template: &str, name: &str) -> bool {
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            return false;
        };

        let expression = after[..close].trim_start_matches('{').trim_matches('~').trim();
        if expression == name {
            return true;
        }
        rest = &after[close + 2..];
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, template: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let content = format!(
            "id: {}\ntitle: \"Test Prompt\"\napiVersion: \"1.0\"\ntemplate: \"{}\"\n",
            id, template
        );
        let file_path = dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_builtin_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = resolve_prompt(temp_dir.path(), CONSENSUS_PROMPT_ID, None).unwrap();
        assert_eq!(prompt.id, CONSENSUS_PROMPT_ID);
    }

    #[test]
    fn test_workspace_override_wins_over_builtin() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            CONSENSUS_PROMPT_ID,
            "Q: {{query}} C: {{context}}",
        );

        let prompt = resolve_prompt(temp_dir.path(), CONSENSUS_PROMPT_ID, None).unwrap();
        assert_eq!(prompt.title, "Test Prompt");
        assert_eq!(prompt.template, "Q: {{query}} C: {{context}}");
    }

    #[test]
    fn test_explicit_file_wins() {
        let temp_dir = TempDir::new().unwrap();
        let file = write_prompt(temp_dir.path(), "other", "{{context}} -> {{query}}");

        let prompt = resolve_prompt(temp_dir.path(), CONSENSUS_PROMPT_ID, Some(&file)).unwrap();
        assert_eq!(prompt.id, "other");
    }

    #[test]
    fn test_unknown_prompt_id() {
        let temp_dir = TempDir::new().unwrap();
        assert!(resolve_prompt(temp_dir.path(), "nope", None).is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("broken.yml");
        fs::write(&file, "invalid: yaml: content:").unwrap();

        assert!(load_prompt_file(&file).is_err());
    }

    #[test]
    fn test_template_must_reference_context() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "noctx", "Only {{query}}");

        let err = load_prompt(temp_dir.path(), "noctx").unwrap_err();
        assert!(err.to_string().contains("{{context}}"));
    }

    #[test]
    fn test_bare_variable_words_are_not_references() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "words",
            "Use the context to answer the query {{currentDate}}",
        );

        let err = load_prompt(temp_dir.path(), "words").unwrap_err();
        assert!(err.to_string().contains("{{query}}"));
    }

    #[test]
    fn test_references_variable_forms() {
        assert!(references_variable("Q: {{query}}", "query"));
        assert!(references_variable("Q: {{ query }}", "query"));
        assert!(references_variable("Q: {{{query}}}", "query"));
        assert!(references_variable("Q: {{~query~}}", "query"));
        assert!(!references_variable("query and context", "query"));
        assert!(!references_variable("{{queryText}}", "query"));
        assert!(!references_variable("{{query", "query"));
    }
}
