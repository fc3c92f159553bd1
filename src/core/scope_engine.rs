//! Context scope selection over a persisted theme graph.
//!
//! `load_context` resolves the effective mode, aggregates files, paths and
//! shared-file maps across the loaded themes, adds the always-visible global
//! paths, loads READMEs and attaches advisory recommendations. Escalation
//! only moves forward: focused, expanded, project-wide.

use crate::domain::config::EngineConfig;
use crate::domain::errors::Result;
use crate::domain::models::{
    ContextMode, ContextResult, EscalationAssessment, IntegrityReport, SharedFile, Theme,
};
use crate::infra::file_system::{find_readme, is_under, probe_global_paths, read_readme};
use crate::infra::theme_store::ThemeStore;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub const ESCALATION_KEYWORDS: &[&str] = &[
    "import",
    "dependency",
    "reference",
    "call",
    "connection",
    "integration",
    "shared",
    "cross",
    "global",
    "config",
];

/// Key used in `ContextResult::readmes` for the project root README.
pub const ROOT_README_KEY: &str = ".";

const ESCALATE_LINKED_THEMES: usize = 2;
const ESCALATE_SHARED_FILES: usize = 5;
const SUGGEST_EXPANDED_SHARED_FILES: usize = 3;
const SUGGEST_EXPANDED_THEME_COUNT: usize = 10;
const SUGGEST_DOCS_MISSING_READMES: usize = 3;
const FILE_MEMORY_MB: f64 = 0.1;
const THEME_MEMORY_MB: f64 = 0.01;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const PRIMARY_PATH_PROXY: usize = 3;
const RELEVANCE_THRESHOLD: f64 = 0.5;
const PRIMARY_PATH_BONUS: f64 = 0.5;
const RELEVANCE_FALLBACK_LIMIT: usize = 10;
const INTEGRITY_FILE_SAMPLE: usize = 10;
const INTEGRITY_PATH_SAMPLE: usize = 5;

/// Picks the effective mode. Only a focused request is ever escalated, and
/// only when the theme is too connected to be understood alone.
pub fn determine_context_mode(primary: &Theme, requested: ContextMode, force_mode: bool) -> ContextMode {
    if force_mode {
        return requested;
    }
    if requested == ContextMode::ThemeFocused
        && (primary.linked_themes.len() > ESCALATE_LINKED_THEMES
            || primary.shared_files.len() > ESCALATE_SHARED_FILES)
    {
        return ContextMode::ThemeExpanded;
    }
    requested
}

/// Insertion-ordered set of strings.
#[derive(Default)]
struct OrderedSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedSet {
    fn insert(&mut self, item: &str) {
        if self.seen.insert(item.to_string()) {
            self.items.push(item.to_string());
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

pub struct ScopeEngine {
    config: EngineConfig,
}

impl ScopeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn load_context(
        &self,
        project_root: &Path,
        primary_theme: &str,
        requested: ContextMode,
        force_mode: bool,
    ) -> Result<ContextResult> {
        let store = ThemeStore::new(project_root);
        let primary = store.load_theme(primary_theme)?;
        let mode = determine_context_mode(&primary, requested, force_mode);
        info!(
            "Loading {} context for theme {} (requested {})",
            mode, primary_theme, requested
        );

        let mut themes = vec![primary];
        match mode {
            ContextMode::ThemeFocused => {}
            ContextMode::ThemeExpanded => {
                let linked: Vec<String> = themes[0]
                    .linked_themes
                    .iter()
                    .filter(|name| name.as_str() != primary_theme)
                    .cloned()
                    .collect();
                for name in linked {
                    if let Some(theme) = load_secondary(&store, &name) {
                        themes.push(theme);
                    }
                }
            }
            ContextMode::ProjectWide => {
                let index = store.load_index().unwrap_or_else(|e| {
                    warn!("Theme index unreadable, loading primary theme only: {}", e);
                    BTreeMap::new()
                });
                for name in index.keys().filter(|name| name.as_str() != primary_theme) {
                    if let Some(theme) = load_secondary(&store, name) {
                        themes.push(theme);
                    }
                }
            }
        }

        let mut files = OrderedSet::default();
        let mut paths = OrderedSet::default();
        let mut shared_files: BTreeMap<String, SharedFile> = BTreeMap::new();
        for theme in &themes {
            for file in &theme.files {
                files.insert(file);
            }
            for path in &theme.paths {
                paths.insert(path);
            }
            for (file, shared) in &theme.shared_files {
                let entry = shared_files.entry(file.clone()).or_insert_with(|| SharedFile {
                    shared_with: Vec::new(),
                    description: shared.description.clone(),
                });
                for other in &shared.shared_with {
                    if !entry.shared_with.contains(other) {
                        entry.shared_with.push(other.clone());
                    }
                }
            }
        }

        let global = probe_global_paths(project_root);
        for file in &global.files {
            files.insert(file);
        }
        for dir in &global.directories {
            paths.insert(dir);
        }
        let files = files.into_vec();
        let paths = paths.into_vec();

        let (readmes, readme_bytes) = self.load_readmes(project_root, &paths);
        let memory_estimate = estimate_memory(files.len(), readme_bytes, themes.len());
        debug!(
            "Context has {} files, {} paths, {} READMEs, ~{}MB",
            files.len(),
            paths.len(),
            readmes.len(),
            memory_estimate
        );

        let mut result = ContextResult {
            mode,
            primary_theme: primary_theme.to_string(),
            loaded_themes: themes.iter().map(|t| t.name.clone()).collect(),
            files,
            paths,
            readmes,
            shared_files,
            recommendations: Vec::new(),
            memory_estimate,
        };
        self.generate_recommendations(&mut result, &themes[0], requested);
        Ok(result)
    }

    /// Root README plus the first README found in each aggregated directory.
    fn load_readmes(&self, project_root: &Path, paths: &[String]) -> (BTreeMap<String, String>, usize) {
        let mut readmes = BTreeMap::new();
        let mut total_bytes = 0;

        if let Some(readme) = read_readme(project_root, self.config.readme_max_chars) {
            total_bytes += readme.content.len();
            readmes.insert(ROOT_README_KEY.to_string(), readme.content);
        }
        for path in paths {
            let dir = project_root.join(path);
            if !dir.is_dir() {
                continue;
            }
            if let Some(readme) = read_readme(&dir, self.config.readme_max_chars) {
                total_bytes += readme.content.len();
                readmes.insert(path.clone(), readme.content);
            }
        }
        (readmes, total_bytes)
    }

    fn generate_recommendations(&self, result: &mut ContextResult, primary: &Theme, requested: ContextMode) {
        let mut recommendations = Vec::new();

        if result.memory_estimate > self.config.memory_ceiling_mb {
            let suggestion = match result.mode {
                ContextMode::ProjectWide => "consider theme-expanded mode".to_string(),
                ContextMode::ThemeExpanded => "consider theme-focused mode".to_string(),
                ContextMode::ThemeFocused => format!("consider splitting theme '{}'", primary.name),
            };
            recommendations.push(format!(
                "Estimated context size {}MB exceeds {}MB; {}",
                result.memory_estimate, self.config.memory_ceiling_mb, suggestion
            ));
        }

        if result.mode != requested {
            recommendations.push(format!(
                "Escalated from {} to {}: theme '{}' has {} linked themes and {} shared files",
                requested,
                result.mode,
                primary.name,
                primary.linked_themes.len(),
                primary.shared_files.len()
            ));
        }

        if requested == ContextMode::ThemeExpanded
            && primary.linked_themes.is_empty()
            && primary.shared_files.is_empty()
        {
            recommendations.push(format!(
                "Theme '{}' has no linked themes or shared files; theme-focused mode may be sufficient",
                primary.name
            ));
        }

        if result.mode == ContextMode::ThemeFocused && result.shared_files.len() > SUGGEST_EXPANDED_SHARED_FILES {
            recommendations.push(format!(
                "Theme '{}' shares {} files with other themes; consider theme-expanded mode",
                primary.name,
                result.shared_files.len()
            ));
        }

        if result.mode == ContextMode::ProjectWide && result.loaded_themes.len() > SUGGEST_EXPANDED_THEME_COUNT {
            recommendations.push(format!(
                "{} themes loaded; theme-expanded mode may be sufficient",
                result.loaded_themes.len()
            ));
        }

        let missing_readmes = result
            .paths
            .iter()
            .filter(|path| !result.readmes.contains_key(path.as_str()))
            .count();
        if missing_readmes > SUGGEST_DOCS_MISSING_READMES {
            recommendations.push(format!(
                "{} paths have no README; consider adding documentation",
                missing_readmes
            ));
        }

        result.recommendations.extend(recommendations);
    }

    /// Keyword heuristic: cross-theme vocabulary in the issue moves the
    /// context one step broader. Never suggests a narrower mode.
    pub fn assess_context_escalation(&self, context: &ContextResult, issue_description: &str) -> EscalationAssessment {
        let current = context.mode;
        let issue = issue_description.to_lowercase();
        let trigger = ESCALATION_KEYWORDS.iter().find(|kw| issue.contains(**kw));

        match (trigger, current.escalate()) {
            (_, None) => EscalationAssessment {
                should_escalate: false,
                suggested_mode: current,
                reason: "Already using project-wide context".to_string(),
            },
            (Some(keyword), Some(next)) => EscalationAssessment {
                should_escalate: true,
                suggested_mode: next,
                reason: format!(
                    "Issue mentions '{}', which suggests impact beyond the current {} context",
                    keyword, current
                ),
            },
            (None, Some(_)) => EscalationAssessment {
                should_escalate: false,
                suggested_mode: current,
                reason: "No cross-theme indicators in the issue description".to_string(),
            },
        }
    }

    /// Ranks context files by how many task words appear in their path.
    /// Files under the first few aggregated paths get a bonus.
    pub fn filter_files_by_relevance(&self, context: &ContextResult, task_description: &str) -> Vec<String> {
        let tokens: Vec<String> = task_description
            .split_whitespace()
            .map(|word| {
                word.to_lowercase()
                    .trim_end_matches(|c: char| c.is_ascii_punctuation())
                    .to_string()
            })
            .filter(|word| word.len() > 2)
            .collect();
        let primary_paths: Vec<&String> = context.paths.iter().take(PRIMARY_PATH_PROXY).collect();
        let in_primary = |file: &str| primary_paths.iter().any(|p| is_under(file, p));

        let mut scored: Vec<(&String, f64)> = context
            .files
            .iter()
            .map(|file| {
                let lowered = file.to_lowercase();
                let words: Vec<&str> = lowered
                    .split(['/', '\\', '_', '-', '.'])
                    .filter(|w| !w.is_empty())
                    .collect();
                let mut score: f64 = tokens
                    .iter()
                    .map(|token| words.iter().filter(|word| word_matches(word, token)).count() as f64)
                    .sum();
                if in_primary(file) {
                    score += PRIMARY_PATH_BONUS;
                }
                (file, score)
            })
            .filter(|(_, score)| *score >= RELEVANCE_THRESHOLD)
            .collect();

        if scored.is_empty() {
            let primary: Vec<String> = context
                .files
                .iter()
                .filter(|f| in_primary(f))
                .take(RELEVANCE_FALLBACK_LIMIT)
                .cloned()
                .collect();
            if !primary.is_empty() {
                return primary;
            }
            return context.files.iter().take(RELEVANCE_FALLBACK_LIMIT).cloned().collect();
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().map(|(file, _)| file.clone()).collect()
    }

    /// Cheap probe of a loaded context: theme files must still exist, and a
    /// sample of files and paths is checked for existence and README coverage.
    pub fn validate_context_integrity(&self, project_root: &Path, context: &ContextResult) -> IntegrityReport {
        let store = ThemeStore::new(project_root);
        let mut report = IntegrityReport::default();

        report.checks_performed.push("theme_files".to_string());
        for name in &context.loaded_themes {
            if !store.theme_exists(name) {
                report.errors.push(format!("Theme file for '{}' is missing", name));
            }
        }

        report.checks_performed.push("file_sample".to_string());
        for file in context.files.iter().take(INTEGRITY_FILE_SAMPLE) {
            if !project_root.join(file).exists() {
                report.warnings.push(format!("File '{}' no longer exists", file));
            }
        }

        report.checks_performed.push("readme_coverage".to_string());
        for path in context.paths.iter().take(INTEGRITY_PATH_SAMPLE) {
            let dir = project_root.join(path);
            if !dir.exists() {
                report.warnings.push(format!("Path '{}' no longer exists", path));
            } else if dir.is_dir() && find_readme(&dir).is_none() {
                report.warnings.push(format!("Path '{}' has no README", path));
            }
        }

        report.valid = report.errors.is_empty();
        report
    }
}

/// Whole-word match, or a shared prefix of at least four characters so that
/// "auth" and "authentication" meet.
fn word_matches(word: &str, token: &str) -> bool {
    if word == token {
        return true;
    }
    let (short, long) = if word.len() < token.len() { (word, token) } else { (token, word) };
    short.len() >= 4 && long.starts_with(short)
}

fn estimate_memory(file_count: usize, readme_bytes: usize, theme_count: usize) -> u64 {
    let estimate = file_count as f64 * FILE_MEMORY_MB
        + readme_bytes as f64 / BYTES_PER_MB
        + theme_count as f64 * THEME_MEMORY_MB;
    estimate as u64
}

fn load_secondary(store: &ThemeStore, name: &str) -> Option<Theme> {
    match store.load_theme(name) {
        Ok(theme) => Some(theme),
        Err(e) => {
            warn!("Skipping theme {} while expanding context: {}", name, e);
            None
        }
    }
}
