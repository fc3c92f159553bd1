use crate::domain::models::{ContextOutput, ContextResult};
use log::{debug, info};
use std::collections::BTreeSet;

fn count_tokens(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Renders files as an indented tree, one directory level per indent.
pub fn generate_file_map(files: &[String]) -> String {
    let mut tree: BTreeSet<Vec<&str>> = BTreeSet::new();
    for file in files {
        let parts: Vec<&str> = file.split('/').filter(|p| !p.is_empty()).collect();
        for depth in 1..=parts.len() {
            tree.insert(parts[..depth].to_vec());
        }
    }

    let mut map = String::new();
    for parts in &tree {
        let indent = "│   ".repeat(parts.len() - 1);
        map.push_str(&format!("{}├── {}\n", indent, parts[parts.len() - 1]));
    }
    map
}

pub fn build_context_output(
    context: &ContextResult,
    files: &[String],
    user_prompt: Option<String>,
) -> ContextOutput {
    debug!(
        "Building context output for theme {} with {} files",
        context.primary_theme,
        files.len()
    );

    let header = format!(
        "theme: {}\nmode: {}\nthemes: {}\nestimated size: {}MB\n",
        context.primary_theme,
        context.mode,
        context.loaded_themes.join(", "),
        context.memory_estimate
    );
    let file_map = generate_file_map(files);

    let mut readmes = String::new();
    for (path, content) in &context.readmes {
        readmes.push_str(&format!("\nREADME: {}\n{}\n", path, content.trim_end()));
    }

    let recommendations: String = context
        .recommendations
        .iter()
        .map(|r| format!("- {}\n", r))
        .collect();

    let user_instructions = match user_prompt {
        Some(prompt) => {
            info!("Including task description in context");
            prompt
        }
        None => String::new(),
    };

    let token_count = [&header, &file_map, &readmes, &recommendations, &user_instructions]
        .iter()
        .map(|part| count_tokens(part))
        .sum();

    ContextOutput {
        header,
        file_map,
        readmes,
        recommendations,
        user_instructions,
        token_count,
    }
}

pub fn format_output(output: &ContextOutput) -> String {
    debug!("Formatting context output with {} tokens", output.token_count);
    let mut result = String::new();

    result.push_str("<context>\n");
    result.push_str(&output.header);
    result.push_str("</context>\n\n");

    result.push_str("<file_map>\n");
    result.push_str(&output.file_map);
    result.push_str("</file_map>\n\n");

    result.push_str("<readmes>");
    result.push_str(&output.readmes);
    result.push_str("</readmes>");

    if !output.recommendations.is_empty() {
        result.push_str("\n\n<recommendations>\n");
        result.push_str(&output.recommendations);
        result.push_str("</recommendations>");
    }

    if !output.user_instructions.is_empty() {
        result.push_str("\n\n<user_instructions>\n");
        result.push_str(&output.user_instructions);
        result.push_str("\n</user_instructions>");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ContextMode;
    use std::collections::BTreeMap;

    fn sample_context() -> ContextResult {
        let mut readmes = BTreeMap::new();
        readmes.insert(".".to_string(), "# Shop\n".to_string());
        ContextResult {
            mode: ContextMode::ThemeExpanded,
            primary_theme: "auth".to_string(),
            loaded_themes: vec!["auth".to_string(), "api".to_string()],
            files: vec!["src/auth/login.ts".to_string(), "package.json".to_string()],
            paths: vec!["src/auth".to_string()],
            readmes,
            shared_files: BTreeMap::new(),
            recommendations: vec!["Escalated from theme-focused to theme-expanded".to_string()],
            memory_estimate: 0,
        }
    }

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens("hello world"), 2);
        assert_eq!(count_tokens(""), 0);
        assert_eq!(count_tokens("one\ntwo\nthree"), 3);
    }

    #[test]
    fn test_generate_file_map() {
        let files = vec!["src/auth/login.ts".to_string(), "package.json".to_string()];
        let map = generate_file_map(&files);

        assert_eq!(map, "├── package.json\n├── src\n│   ├── auth\n│   │   ├── login.ts\n");
    }

    #[test]
    fn test_build_context_output() {
        let context = sample_context();
        let output = build_context_output(&context, &context.files, Some("Fix login".to_string()));

        assert!(output.header.contains("mode: theme-expanded"));
        assert!(output.header.contains("themes: auth, api"));
        assert!(output.readmes.contains("README: .\n# Shop"));
        assert_eq!(output.user_instructions, "Fix login");
        assert!(output.token_count > 0);
    }

    #[test]
    fn test_format_output() {
        let context = sample_context();
        let output = build_context_output(&context, &context.files, None);
        let formatted = format_output(&output);

        assert!(formatted.starts_with("<context>\ntheme: auth\n"));
        assert!(formatted.contains("<file_map>\n├── package.json\n"));
        assert!(formatted.contains("<recommendations>\n- Escalated from"));
        assert!(!formatted.contains("<user_instructions>"));
    }
}
