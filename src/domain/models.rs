use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Source,
    Config,
    Documentation,
    Database,
    Deployment,
    Vcs,
    Unknown,
}

/// Signals extracted from a single file during the project walk.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: String,
    pub extension: String,
    pub language: Option<&'static str>,
    pub file_type: FileType,
    pub size: u64,
    /// False when the file was over the size cutoff or unreadable.
    pub analyzed: bool,
    pub imports: Vec<String>,
    pub keywords: BTreeMap<String, usize>,
    pub frameworks: BTreeSet<String>,
}

impl FileRecord {
    pub fn metadata_only(path: String, extension: String, file_type: FileType, size: u64) -> Self {
        Self {
            language: None,
            path,
            extension,
            file_type,
            size,
            analyzed: false,
            imports: Vec::new(),
            keywords: BTreeMap::new(),
            frameworks: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryPurpose {
    pub path: String,
    pub category: &'static str,
    pub confidence: f64,
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFile {
    pub shared_with: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub directories: BTreeSet<String>,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default)]
    pub frameworks: BTreeSet<String>,
    #[serde(default)]
    pub files: BTreeSet<String>,
}

impl Evidence {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
            && self.keywords.is_empty()
            && self.frameworks.is_empty()
            && self.files.is_empty()
    }
}

fn default_confidence() -> f64 {
    1.0
}

/// A persisted theme definition. Unknown JSON fields are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(rename = "theme", default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub paths: BTreeSet<String>,
    #[serde(default)]
    pub files: BTreeSet<String>,
    #[serde(default)]
    pub linked_themes: BTreeSet<String>,
    #[serde(default)]
    pub shared_files: BTreeMap<String, SharedFile>,
    #[serde(default)]
    pub frameworks: BTreeSet<String>,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Evidence::is_empty")]
    pub evidence: Evidence,
}

impl Theme {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: String::new(),
            confidence: default_confidence(),
            paths: BTreeSet::new(),
            files: BTreeSet::new(),
            linked_themes: BTreeSet::new(),
            shared_files: BTreeMap::new(),
            frameworks: BTreeSet::new(),
            keywords: BTreeSet::new(),
            evidence: Evidence::default(),
        }
    }
}

/// Fields to merge into an existing theme; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ThemeUpdate {
    pub description: Option<String>,
    pub category: Option<String>,
    pub paths: Option<BTreeSet<String>>,
    pub files: Option<BTreeSet<String>>,
    pub linked_themes: Option<BTreeSet<String>>,
    pub frameworks: Option<BTreeSet<String>>,
    pub keywords: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryMetadata {
    pub discovery_method: String,
    pub total_files: usize,
    pub total_directories: usize,
    pub languages: BTreeSet<String>,
    pub frameworks: BTreeSet<String>,
    pub directory_purposes: BTreeMap<String, usize>,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryResult {
    pub themes: BTreeMap<String, Theme>,
    pub metadata: DiscoveryMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextMode {
    ThemeFocused,
    ThemeExpanded,
    ProjectWide,
}

impl ContextMode {
    /// The next broader mode, if any. Escalation only ever moves forward.
    pub fn escalate(self) -> Option<ContextMode> {
        match self {
            ContextMode::ThemeFocused => Some(ContextMode::ThemeExpanded),
            ContextMode::ThemeExpanded => Some(ContextMode::ProjectWide),
            ContextMode::ProjectWide => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContextMode::ThemeFocused => "theme-focused",
            ContextMode::ThemeExpanded => "theme-expanded",
            ContextMode::ProjectWide => "project-wide",
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "focused" | "theme-focused" => Ok(ContextMode::ThemeFocused),
            "expanded" | "theme-expanded" => Ok(ContextMode::ThemeExpanded),
            "project" | "project-wide" => Ok(ContextMode::ProjectWide),
            other => Err(format!("unknown context mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResult {
    pub mode: ContextMode,
    pub primary_theme: String,
    pub loaded_themes: Vec<String>,
    pub files: Vec<String>,
    pub paths: Vec<String>,
    pub readmes: BTreeMap<String, String>,
    pub shared_files: BTreeMap<String, SharedFile>,
    pub recommendations: Vec<String>,
    pub memory_estimate: u64,
}

/// A rendered context block ready for output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextOutput {
    pub header: String,
    pub file_map: String,
    pub readmes: String,
    pub recommendations: String,
    pub user_instructions: String,
    pub token_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationAssessment {
    pub should_escalate: bool,
    pub suggested_mode: ContextMode,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub checks_performed: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub themes_checked: usize,
}
