//! Heuristic theme discovery over a project tree.
//!
//! A single walk produces per-file signals and per-directory purposes. Each
//! taxonomy rule is scored from directory-name matches, keyword frequency and
//! detected frameworks; recurring directory-name tokens become custom themes.
//! Themes claiming the same file, or whose files import one another, are
//! linked in both directions.

use crate::core::file_analyzer::{self, is_binary_extension};
use crate::core::taxonomy::{
    DIRECTORY_WEIGHT, FRAMEWORK_WEIGHT, KEYWORD_WEIGHT, THEME_TAXONOMY, ThemeRule, category_label,
};
use crate::domain::config::EngineConfig;
use crate::domain::errors::Result;
use crate::domain::models::{
    DirectoryPurpose, DiscoveryMetadata, DiscoveryResult, Evidence, FileRecord, SharedFile, Theme,
};
use crate::infra::file_system::{ProjectTree, is_under, read_file_contents, walk_project};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const CUSTOM_TOKEN_STOP_LIST: &[&str] = &[
    "src", "source", "sources", "test", "tests", "build", "dist", "main", "app", "apps", "lib",
    "libs", "core", "common", "utils", "util", "public", "static", "assets", "docs", "config",
    "scripts", "vendor", "internal", "pkg", "packages", "modules", "index", "temp", "tmp", "misc",
    "examples", "example", "resources", "include",
];

const CUSTOM_MIN_OCCURRENCES: usize = 2;
const CUSTOM_SCORE_CEILING: f64 = 5.0;
const FALLBACK_CONFIDENCE: f64 = 0.8;
const FALLBACK_DEPTH: usize = 2;

/// Directory purposes that add their directory to a discovered theme.
const PURPOSE_THEMES: &[(&str, &str)] = &[
    ("testing", "testing"),
    ("ui", "components"),
    ("api", "api"),
    ("data", "models"),
    ("configuration", "configuration"),
    ("documentation", "documentation"),
    ("utilities", "utilities"),
    ("styling", "styles"),
];

/// Aggregated output of the structural pass.
pub struct ProjectAnalysis {
    pub tree: ProjectTree,
    pub records: Vec<FileRecord>,
    pub purposes: Vec<DirectoryPurpose>,
    pub keyword_counts: BTreeMap<String, usize>,
    pub frameworks: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    pub imports: BTreeMap<String, Vec<String>>,
}

struct Candidate {
    name: String,
    category: String,
    score: f64,
    description: Option<String>,
    evidence: Evidence,
}

pub struct ThemeDiscovery {
    config: EngineConfig,
}

impl ThemeDiscovery {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn discover_themes(&self, root: &Path) -> Result<DiscoveryResult> {
        info!("Discovering themes in {}", root.display());
        let analysis = self.analyze_structure(root)?;

        let mut candidates: BTreeMap<String, Candidate> = BTreeMap::new();
        for candidate in self.score_taxonomy(&analysis) {
            candidates.insert(candidate.name.clone(), candidate);
        }
        for candidate in discover_custom_themes(&analysis) {
            candidates.entry(candidate.name.clone()).or_insert(candidate);
        }

        let mut metadata = DiscoveryMetadata {
            discovery_method: "multi-factor-scoring".to_string(),
            total_files: analysis.tree.files.len(),
            total_directories: analysis.tree.directories.len(),
            languages: analysis.languages.clone(),
            frameworks: analysis.frameworks.clone(),
            directory_purposes: BTreeMap::new(),
            threshold: self.config.discovery_threshold,
        };
        for purpose in &analysis.purposes {
            *metadata
                .directory_purposes
                .entry(purpose.category.to_string())
                .or_insert(0) += 1;
        }

        if candidates.is_empty() {
            info!("No theme cleared the threshold, falling back to a main theme");
            metadata.discovery_method = "fallback".to_string();
            let theme = fallback_theme(&analysis);
            let mut themes = BTreeMap::new();
            themes.insert(theme.name.clone(), theme);
            return Ok(DiscoveryResult { themes, metadata });
        }

        assign_purpose_directories(&mut candidates, &analysis.purposes);
        assign_files(&mut candidates, &analysis);
        let links = build_relationships(&candidates, &analysis);
        let themes = assemble_definitions(candidates, links);

        info!("Discovered {} themes", themes.len());
        Ok(DiscoveryResult { themes, metadata })
    }

    /// Walks the tree once and extracts file records, directory purposes and
    /// the project-wide keyword, framework, language and import tables.
    pub fn analyze_structure(&self, root: &Path) -> Result<ProjectAnalysis> {
        let tree = walk_project(root, self.config.respect_gitignore)?;

        let mut records = Vec::with_capacity(tree.files.len());
        for file in &tree.files {
            let extension = file_analyzer::extension_of(&file.name);
            if is_binary_extension(&extension) {
                records.push(file_analyzer::metadata_record(&file.path, &file.name, file.size));
                continue;
            }
            let record = match read_file_contents(&file.absolute, self.config.max_file_size_bytes) {
                Ok(Some(content)) => file_analyzer::analyze_content(
                    &file.path,
                    &file.name,
                    file.size,
                    &content,
                    self.config.max_keywords_per_file,
                    self.config.json_keyword_depth,
                ),
                Ok(None) => file_analyzer::metadata_record(&file.path, &file.name, file.size),
                Err(e) => {
                    debug!("Skipping content of {}: {}", file.path, e);
                    file_analyzer::metadata_record(&file.path, &file.name, file.size)
                }
            };
            records.push(record);
        }

        let mut files_by_dir: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for file in &tree.files {
            let parent = file.path.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            files_by_dir.entry(parent).or_default().push(file.name.clone());
        }
        let purposes = tree
            .directories
            .iter()
            .map(|dir| {
                let names = files_by_dir.get(dir.path.as_str()).cloned().unwrap_or_default();
                file_analyzer::classify_directory(&dir.path, &dir.name, &names)
            })
            .collect();

        let mut keyword_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut frameworks = BTreeSet::new();
        let mut languages = BTreeSet::new();
        let mut imports: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in &records {
            for (keyword, count) in &record.keywords {
                *keyword_counts.entry(keyword.clone()).or_insert(0) += count;
            }
            frameworks.extend(record.frameworks.iter().cloned());
            if let Some(language) = record.language {
                languages.insert(language.to_string());
            }
            if !record.imports.is_empty() {
                imports.insert(record.path.clone(), record.imports.clone());
            }
        }

        debug!(
            "Structure: {} keywords, {} frameworks, {} languages",
            keyword_counts.len(),
            frameworks.len(),
            languages.len()
        );
        Ok(ProjectAnalysis {
            tree,
            records,
            purposes,
            keyword_counts,
            frameworks,
            languages,
            imports,
        })
    }

    fn score_taxonomy(&self, analysis: &ProjectAnalysis) -> Vec<Candidate> {
        let mut discovered = Vec::new();
        for category in THEME_TAXONOMY {
            for rule in category.themes {
                let (score, evidence) = score_rule(rule, analysis);
                if score > self.config.discovery_threshold {
                    debug!("Theme {} scored {:.3}", rule.name, score);
                    discovered.push(Candidate {
                        name: rule.name.to_string(),
                        category: category.name.to_string(),
                        score,
                        description: None,
                        evidence,
                    });
                }
            }
        }
        discovered
    }
}

/// Weighted score of one taxonomy rule against the analysed project, with
/// the evidence that produced it.
pub fn score_rule(rule: &ThemeRule, analysis: &ProjectAnalysis) -> (f64, Evidence) {
    let mut evidence = Evidence::default();

    let lowered: Vec<(String, &str)> = analysis
        .tree
        .directories
        .iter()
        .map(|d| (d.name.to_lowercase(), d.path.as_str()))
        .collect();
    let mut matched_fragments = 0;
    for fragment in rule.directories {
        let mut found = false;
        for (name, path) in &lowered {
            if name.contains(fragment) {
                evidence.directories.insert(path.to_string());
                found = true;
            }
        }
        if found {
            matched_fragments += 1;
        }
    }
    let directory_score = matched_fragments as f64 / rule.directories.len() as f64;

    let mut hits = 0usize;
    for keyword in rule.keywords {
        if let Some(count) = analysis.keyword_counts.get(*keyword) {
            hits += count;
            evidence.keywords.insert(keyword.to_string());
        }
    }
    let keyword_score = (hits as f64 / (2 * rule.keywords.len()) as f64).min(1.0);

    let framework_score = if rule.frameworks.is_empty() {
        0.0
    } else {
        for framework in rule.frameworks {
            if analysis.frameworks.contains(*framework) {
                evidence.frameworks.insert(framework.to_string());
            }
        }
        evidence.frameworks.len() as f64 / rule.frameworks.len() as f64
    };

    let score = DIRECTORY_WEIGHT * directory_score
        + KEYWORD_WEIGHT * keyword_score
        + FRAMEWORK_WEIGHT * framework_score;
    (score, evidence)
}

fn custom_tokens(name: &str) -> impl Iterator<Item = String> + '_ {
    name.split(['-', '_', '.', ' '])
        .map(str::to_lowercase)
        .filter(|token| token.len() > 3 && !CUSTOM_TOKEN_STOP_LIST.contains(&token.as_str()))
}

fn discover_custom_themes(analysis: &ProjectAnalysis) -> Vec<Candidate> {
    let mut occurrences: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for dir in &analysis.tree.directories {
        for token in custom_tokens(&dir.name) {
            occurrences.entry(token).or_default().insert(dir.path.clone());
        }
    }

    occurrences
        .into_iter()
        .filter(|(_, dirs)| dirs.len() >= CUSTOM_MIN_OCCURRENCES)
        .map(|(token, dirs)| {
            let count = dirs.len();
            debug!("Custom theme candidate {} ({} directories)", token, count);
            Candidate {
                name: format!("custom-{}", token),
                category: "custom".to_string(),
                score: (count as f64 / CUSTOM_SCORE_CEILING).min(1.0),
                description: Some(format!(
                    "Custom theme for the recurring '{}' directories ({} occurrences)",
                    token, count
                )),
                evidence: Evidence {
                    directories: dirs,
                    ..Evidence::default()
                },
            }
        })
        .collect()
}

fn assign_purpose_directories(candidates: &mut BTreeMap<String, Candidate>, purposes: &[DirectoryPurpose]) {
    for purpose in purposes.iter().filter(|p| p.confidence >= 0.5) {
        let Some((_, theme)) = PURPOSE_THEMES.iter().find(|(category, _)| *category == purpose.category) else {
            continue;
        };
        if let Some(candidate) = candidates.get_mut(*theme) {
            candidate.evidence.directories.insert(purpose.path.clone());
        }
    }
}

/// Final membership: the file sits under an evidence directory, or its name
/// contains an evidence keyword.
fn assign_files(candidates: &mut BTreeMap<String, Candidate>, analysis: &ProjectAnalysis) {
    for candidate in candidates.values_mut() {
        let mut files = BTreeSet::new();
        for file in &analysis.tree.files {
            let in_directory = candidate
                .evidence
                .directories
                .iter()
                .any(|dir| is_under(&file.path, dir));
            let name = file.name.to_lowercase();
            let keyword_hit = candidate.evidence.keywords.iter().any(|kw| name.contains(kw.as_str()));
            if in_directory || keyword_hit {
                files.insert(file.path.clone());
            }
        }
        candidate.evidence.files = files;
    }
}

fn join_relative(base_dir: &str, relative: &str) -> String {
    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn strip_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((head, ext)) if !head.is_empty() && !head.ends_with('/') && !ext.contains('/') => head,
        _ => path,
    }
}

/// Best-effort mapping from an import string to a project file.
fn resolve_import(
    from: &str,
    import: &str,
    files: &BTreeSet<&str>,
    stems: &BTreeMap<&str, &str>,
) -> Option<String> {
    let parent = from.rsplit_once('/').map(|(p, _)| p).unwrap_or("");

    if import.starts_with("./") || import.starts_with("../") {
        let target = join_relative(parent, import);
        if files.contains(target.as_str()) {
            return Some(target);
        }
        return stems
            .get(target.as_str())
            .or_else(|| stems.get(format!("{}/index", target).as_str()))
            .map(|f| f.to_string());
    }

    if import.starts_with('.') {
        let dots = import.chars().take_while(|c| *c == '.').count();
        let mut base = parent.to_string();
        for _ in 1..dots {
            base = base.rsplit_once('/').map(|(p, _)| p.to_string()).unwrap_or_default();
        }
        let rest = import[dots..].replace('.', "/");
        let target = join_relative(&base, &rest);
        return stems
            .get(target.as_str())
            .or_else(|| stems.get(format!("{}/__init__", target).as_str()))
            .map(|f| f.to_string());
    }

    let mut module = import
        .trim_start_matches("crate::")
        .trim_start_matches("self::")
        .trim_start_matches("super::")
        .replace("::", "/")
        .replace('.', "/");
    loop {
        if module.is_empty() {
            return None;
        }
        let suffix = format!("/{}", module);
        if let Some((_, file)) = stems
            .iter()
            .find(|(stem, _)| **stem == module || stem.ends_with(&suffix))
        {
            return Some(file.to_string());
        }
        match module.rsplit_once('/') {
            Some((head, _)) => module = head.to_string(),
            None => return None,
        }
    }
}

fn add_link(links: &mut BTreeMap<String, BTreeSet<String>>, a: &str, b: &str) {
    if a != b {
        links.entry(a.to_string()).or_default().insert(b.to_string());
        links.entry(b.to_string()).or_default().insert(a.to_string());
    }
}

/// Symmetric theme links from shared files and cross-theme imports.
fn build_relationships(
    candidates: &BTreeMap<String, Candidate>,
    analysis: &ProjectAnalysis,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut links: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for candidate in candidates.values() {
        for file in &candidate.evidence.files {
            owners.entry(file.as_str()).or_default().push(candidate.name.as_str());
        }
    }
    for themes in owners.values().filter(|t| t.len() > 1) {
        for (i, a) in themes.iter().enumerate() {
            for b in &themes[i + 1..] {
                add_link(&mut links, a, b);
            }
        }
    }

    let files: BTreeSet<&str> = analysis.tree.files.iter().map(|f| f.path.as_str()).collect();
    let stems: BTreeMap<&str, &str> = files.iter().map(|f| (strip_extension(*f), *f)).collect();
    for candidate in candidates.values() {
        for file in &candidate.evidence.files {
            let Some(imports) = analysis.imports.get(file) else {
                continue;
            };
            for import in imports {
                let Some(target) = resolve_import(file, import, &files, &stems) else {
                    continue;
                };
                if let Some(target_owners) = owners.get(target.as_str()) {
                    for owner in target_owners {
                        add_link(&mut links, &candidate.name, owner);
                    }
                }
            }
        }
    }

    links
}

fn join_first(items: &BTreeSet<String>, limit: usize) -> String {
    items.iter().take(limit).cloned().collect::<Vec<_>>().join(", ")
}

fn describe(category: &str, name: &str, evidence: &Evidence) -> String {
    let mut description = format!("{} theme '{}'", category_label(category), name);
    if !evidence.frameworks.is_empty() {
        description.push_str(&format!(" using {}", join_first(&evidence.frameworks, 3)));
    }
    if !evidence.keywords.is_empty() {
        description.push_str(&format!("; keywords: {}", join_first(&evidence.keywords, 5)));
    }
    if !evidence.directories.is_empty() {
        description.push_str(&format!("; directories: {}", join_first(&evidence.directories, 3)));
    }
    description
}

fn assemble_definitions(
    candidates: BTreeMap<String, Candidate>,
    mut links: BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, Theme> {
    let mut owners: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for candidate in candidates.values() {
        for file in &candidate.evidence.files {
            owners.entry(file.clone()).or_default().insert(candidate.name.clone());
        }
    }

    let mut themes = BTreeMap::new();
    for (name, candidate) in candidates {
        let mut theme = Theme::new(name.clone(), candidate.category.clone());
        theme.description = candidate
            .description
            .clone()
            .unwrap_or_else(|| describe(&candidate.category, &name, &candidate.evidence));
        theme.confidence = candidate.score;
        theme.paths = candidate.evidence.directories.clone();
        theme.files = candidate.evidence.files.clone();
        theme.linked_themes = links.remove(&name).unwrap_or_default();
        theme.frameworks = candidate.evidence.frameworks.clone();
        theme.keywords = candidate.evidence.keywords.clone();

        for file in &theme.files {
            let others: Vec<String> = owners
                .get(file)
                .map(|set| set.iter().filter(|o| **o != name).cloned().collect())
                .unwrap_or_default();
            if !others.is_empty() {
                let description = format!("Shared with {}", others.join(", "));
                theme.shared_files.insert(
                    file.clone(),
                    SharedFile {
                        shared_with: others,
                        description,
                    },
                );
            }
        }

        theme.evidence = candidate.evidence;
        themes.insert(name, theme);
    }
    themes
}

/// Single theme over the top two path levels, used when nothing else was found.
fn fallback_theme(analysis: &ProjectAnalysis) -> Theme {
    let mut theme = Theme::new("main", "general");
    theme.description = "Main project theme covering the top-level structure".to_string();
    theme.confidence = FALLBACK_CONFIDENCE;
    theme.paths = analysis
        .tree
        .directories
        .iter()
        .filter(|d| d.depth <= FALLBACK_DEPTH)
        .map(|d| d.path.clone())
        .collect();
    theme.files = analysis
        .tree
        .files
        .iter()
        .filter(|f| f.depth <= FALLBACK_DEPTH)
        .map(|f| f.path.clone())
        .collect();
    if theme.files.is_empty() {
        warn!("Fallback theme has no files");
    }
    theme.evidence.directories = theme.paths.clone();
    theme.evidence.files = theme.files.clone();
    theme
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn discover(root: &Path) -> DiscoveryResult {
        ThemeDiscovery::new(EngineConfig::default())
            .discover_themes(root)
            .unwrap()
    }

    fn login_project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        touch(
            temp_dir.path(),
            "src/auth/login.js",
            "export function login(user, password) { return createToken(user, password); }\n",
        );
        touch(
            temp_dir.path(),
            "src/components/LoginForm.jsx",
            "import React from 'react';\nexport default function LoginForm() { return <form />; }\n",
        );
        temp_dir
    }

    #[test]
    fn test_discovers_authentication_and_components() {
        let project = login_project();
        let result = discover(project.path());

        let auth = result.themes.get("authentication").expect("authentication theme");
        assert_eq!(auth.category, "functional_domains");
        assert!(auth.evidence.files.contains("src/auth/login.js"));
        assert!(auth.paths.contains("src/auth"));

        let components = result.themes.get("components").expect("components theme");
        assert!(components.evidence.files.contains("src/components/LoginForm.jsx"));
        assert!(components.frameworks.contains("react"));

        assert_eq!(result.metadata.discovery_method, "multi-factor-scoring");
        assert_eq!(result.metadata.total_files, 2);
        assert_eq!(result.metadata.total_directories, 3);
        assert!(result.metadata.languages.contains("javascript"));
    }

    #[test]
    fn test_shared_files_link_themes_symmetrically() {
        let project = login_project();
        let result = discover(project.path());

        let auth = &result.themes["authentication"];
        let components = &result.themes["components"];
        assert!(auth.files.contains("src/components/LoginForm.jsx"));
        assert!(auth.linked_themes.contains("components"));
        assert!(components.linked_themes.contains("authentication"));

        let shared = &components.shared_files["src/components/LoginForm.jsx"];
        assert!(shared.shared_with.contains(&"authentication".to_string()));
        assert!(!shared.shared_with.contains(&"components".to_string()));
    }

    #[test]
    fn test_imports_link_themes() {
        let temp_dir = TempDir::new().unwrap();
        touch(
            temp_dir.path(),
            "src/api/routes.js",
            "import { session } from '../auth/session';\nexport const route = () => session();\n",
        );
        touch(
            temp_dir.path(),
            "src/auth/session.js",
            "export function session() { return 'token'; }\n",
        );

        let result = discover(temp_dir.path());
        let api = &result.themes["api"];
        let auth = &result.themes["authentication"];
        assert!(!api.files.contains("src/auth/session.js"));
        assert!(api.linked_themes.contains("authentication"));
        assert!(auth.linked_themes.contains("api"));
    }

    #[test]
    fn test_scores_clear_threshold() {
        let project = login_project();
        let result = discover(project.path());
        for theme in result.themes.values() {
            assert!(theme.confidence > 0.05, "{} scored {}", theme.name, theme.confidence);
        }
    }

    #[test]
    fn test_discovery_is_deterministic() {
        let project = login_project();
        touch(project.path(), "tests/auth/login.test.js", "expect(login()).toBe(true);");
        let first = serde_json::to_value(discover(project.path())).unwrap();
        let second = serde_json::to_value(discover(project.path())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_theme_from_recurring_directory_names() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "apps/reporting/a.txt", "alpha");
        touch(temp_dir.path(), "libs/reporting/b.txt", "beta");

        let result = discover(temp_dir.path());
        let custom = result.themes.get("custom-reporting").expect("custom theme");
        assert_eq!(custom.category, "custom");
        assert!((custom.confidence - 0.4).abs() < 1e-9);
        assert_eq!(custom.files.len(), 2);
        assert!(!result.themes.contains_key("custom-apps"));
    }

    #[test]
    fn test_fallback_main_theme() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "zeta.txt", "lorem ipsum");
        touch(temp_dir.path(), "alpha/notes.txt", "lorem ipsum dolor");
        touch(temp_dir.path(), "alpha/beta/gamma/deep.txt", "sit amet");

        let result = discover(temp_dir.path());
        assert_eq!(result.themes.len(), 1);
        let main = &result.themes["main"];
        assert_eq!(main.confidence, 0.8);
        assert_eq!(result.metadata.discovery_method, "fallback");
        assert!(main.files.contains("zeta.txt"));
        assert!(main.files.contains("alpha/notes.txt"));
        assert!(!main.files.contains("alpha/beta/gamma/deep.txt"));
        assert!(main.paths.contains("alpha/beta"));
        assert!(!main.paths.contains("alpha/beta/gamma"));
    }

    #[test]
    fn test_large_files_contribute_metadata_only() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "src/big.js", "import express from 'express';\n");
        let config = EngineConfig {
            max_file_size_bytes: 4,
            ..EngineConfig::default()
        };

        let analysis = ThemeDiscovery::new(config)
            .analyze_structure(temp_dir.path())
            .unwrap();
        assert_eq!(analysis.records.len(), 1);
        assert!(!analysis.records[0].analyzed);
        assert!(analysis.frameworks.is_empty());
    }

    #[test]
    fn test_unreadable_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(
            ThemeDiscovery::new(EngineConfig::default())
                .discover_themes(&missing)
                .is_err()
        );
    }

    #[test]
    fn test_resolve_import_variants() {
        let files: BTreeSet<&str> = ["src/auth/session.js", "src/ui/index.ts", "app/models/user.py"]
            .into_iter()
            .collect();
        let stems: BTreeMap<&str, &str> = files.iter().map(|f| (strip_extension(*f), *f)).collect();

        assert_eq!(
            resolve_import("src/api/routes.js", "../auth/session", &files, &stems).as_deref(),
            Some("src/auth/session.js")
        );
        assert_eq!(
            resolve_import("src/app.js", "./ui", &files, &stems).as_deref(),
            Some("src/ui/index.ts")
        );
        assert_eq!(
            resolve_import("app/views/home.py", "app.models.user", &files, &stems).as_deref(),
            Some("app/models/user.py")
        );
        assert_eq!(
            resolve_import("app/views/home.py", "..models.user", &files, &stems).as_deref(),
            Some("app/models/user.py")
        );
        assert_eq!(resolve_import("src/a.js", "left-pad", &files, &stems), None);
    }
}
