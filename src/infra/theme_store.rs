use crate::domain::errors::{Result, ThemeError};
use crate::domain::models::{DiscoveryResult, Theme, ThemeUpdate, ValidationReport};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const THEMES_DIR: &str = "projectManagement/Themes";
pub const INDEX_FILE: &str = "themes.json";

const REQUIRED_FIELDS: &[(&str, FieldKind)] = &[
    ("theme", FieldKind::String),
    ("description", FieldKind::String),
    ("paths", FieldKind::Array),
    ("files", FieldKind::Array),
];

const OPTIONAL_FIELDS: &[(&str, FieldKind)] = &[
    ("category", FieldKind::String),
    ("confidence", FieldKind::Number),
    ("linkedThemes", FieldKind::Array),
    ("sharedFiles", FieldKind::Object),
    ("frameworks", FieldKind::Array),
    ("keywords", FieldKind::Array),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldKind {
    String,
    Number,
    Array,
    Object,
}

impl FieldKind {
    fn name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
        }
    }
}

#[derive(Debug, PartialEq)]
enum FieldState<'a> {
    Valid(&'a Value),
    Invalid,
    Absent,
}

fn field_state<'a>(doc: &'a Value, key: &str, kind: FieldKind) -> FieldState<'a> {
    match doc.get(key) {
        None | Some(Value::Null) => FieldState::Absent,
        Some(value) if kind.accepts(value) => FieldState::Valid(value),
        Some(_) => FieldState::Invalid,
    }
}

fn string_items(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

pub fn validate_theme_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name == INDEX_FILE.trim_end_matches(".json");
    if invalid {
        return Err(ThemeError::InvalidThemeName(name.to_string()));
    }
    Ok(())
}

/// One JSON document per theme plus a `themes.json` index of name to
/// description, both under `projectManagement/Themes/`.
pub struct ThemeStore {
    root: PathBuf,
}

impl ThemeStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.root.join(THEMES_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.themes_dir().join(INDEX_FILE)
    }

    pub fn theme_path(&self, name: &str) -> PathBuf {
        self.themes_dir().join(format!("{}.json", name))
    }

    pub fn theme_exists(&self, name: &str) -> bool {
        self.theme_path(name).is_file()
    }

    pub fn load_theme(&self, name: &str) -> Result<Theme> {
        validate_theme_name(name)?;
        let path = self.theme_path(name);
        if !path.is_file() {
            return Err(ThemeError::ThemeNotFound(name.to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        let mut theme: Theme = serde_json::from_str(&raw).map_err(|source| ThemeError::MalformedTheme {
            name: name.to_string(),
            source,
        })?;
        if theme.name.is_empty() {
            theme.name = name.to_string();
        }
        debug!("Loaded theme {} ({} files)", name, theme.files.len());
        Ok(theme)
    }

    /// A missing index is an empty index.
    pub fn load_index(&self) -> Result<BTreeMap<String, String>> {
        let path = self.index_path();
        if !path.is_file() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn list_themes(&self) -> Result<BTreeMap<String, String>> {
        self.load_index()
    }

    pub fn save_theme(&self, theme: &Theme) -> Result<()> {
        validate_theme_name(&theme.name)?;
        fs::create_dir_all(self.themes_dir())?;
        let path = self.theme_path(&theme.name);
        fs::write(&path, serde_json::to_string_pretty(theme)?)?;
        debug!("Wrote theme file {}", path.display());
        Ok(())
    }

    pub fn save_index(&self, index: &BTreeMap<String, String>) -> Result<()> {
        fs::create_dir_all(self.themes_dir())?;
        fs::write(self.index_path(), serde_json::to_string_pretty(index)?)?;
        Ok(())
    }

    /// Writes discovered themes and rebuilds the index. Existing theme files
    /// are kept unless `force` is set. Returns the names written.
    pub fn persist_discovery(&self, result: &DiscoveryResult, force: bool) -> Result<Vec<String>> {
        let mut index = self.load_index()?;
        let mut written = Vec::new();

        for (name, theme) in &result.themes {
            if self.theme_exists(name) && !force {
                debug!("Keeping existing theme {}", name);
                index.entry(name.clone()).or_insert_with(|| theme.description.clone());
                continue;
            }
            self.save_theme(theme)?;
            index.insert(name.clone(), theme.description.clone());
            written.push(name.clone());
        }

        self.save_index(&index)?;
        info!(
            "Persisted {} of {} discovered themes",
            written.len(),
            result.themes.len()
        );
        Ok(written)
    }

    pub fn create_theme(
        &self,
        name: &str,
        description: &str,
        paths: BTreeSet<String>,
        files: BTreeSet<String>,
    ) -> Result<Theme> {
        validate_theme_name(name)?;
        if self.theme_exists(name) {
            return Err(ThemeError::ThemeExists(name.to_string()));
        }

        let mut theme = Theme::new(name, "user-defined");
        theme.description = description.to_string();
        theme.paths = paths;
        theme.files = files;
        self.save_theme(&theme)?;

        let mut index = self.load_index()?;
        index.insert(name.to_string(), theme.description.clone());
        self.save_index(&index)?;
        info!("Created theme {}", name);
        Ok(theme)
    }

    pub fn update_theme(&self, name: &str, update: ThemeUpdate) -> Result<Theme> {
        let mut theme = self.load_theme(name)?;

        if let Some(description) = update.description {
            theme.description = description;
        }
        if let Some(category) = update.category {
            theme.category = category;
        }
        if let Some(paths) = update.paths {
            theme.paths = paths;
        }
        if let Some(files) = update.files {
            theme.files = files;
        }
        if let Some(linked) = update.linked_themes {
            theme.linked_themes = linked;
        }
        if let Some(frameworks) = update.frameworks {
            theme.frameworks = frameworks;
        }
        if let Some(keywords) = update.keywords {
            theme.keywords = keywords;
        }
        self.save_theme(&theme)?;

        let mut index = self.load_index()?;
        index.insert(name.to_string(), theme.description.clone());
        self.save_index(&index)?;
        Ok(theme)
    }

    /// Removes the theme file and its index entry. Links from other themes
    /// are left in place and show up as validation issues.
    pub fn delete_theme(&self, name: &str) -> Result<()> {
        validate_theme_name(name)?;
        let path = self.theme_path(name);
        if !path.is_file() {
            return Err(ThemeError::ThemeNotFound(name.to_string()));
        }
        fs::remove_file(&path)?;

        let mut index = self.load_index()?;
        index.remove(name);
        self.save_index(&index)?;
        info!("Deleted theme {}", name);
        Ok(())
    }

    fn theme_file_names(&self) -> Result<Vec<String>> {
        let dir = self.themes_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter(|path| path.file_name().is_some_and(|n| n != INDEX_FILE))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().to_string()))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Checks every theme file and the index for consistency. Problems are
    /// reported, never repaired.
    pub fn validate_themes(&self) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();

        let index = match self.load_index() {
            Ok(index) => index,
            Err(e) => {
                report.issues.push(format!("Theme index is unreadable: {}", e));
                BTreeMap::new()
            }
        };
        let names = self.theme_file_names()?;
        if names.is_empty() && index.is_empty() {
            report.warnings.push("No themes found".to_string());
        }

        for name in &names {
            report.themes_checked += 1;
            let raw = match fs::read_to_string(self.theme_path(name)) {
                Ok(raw) => raw,
                Err(e) => {
                    report.issues.push(format!("Theme '{}' is unreadable: {}", name, e));
                    continue;
                }
            };
            let doc: Value = match serde_json::from_str(&raw) {
                Ok(doc) => doc,
                Err(e) => {
                    report.issues.push(format!("Theme '{}' is not valid JSON: {}", name, e));
                    continue;
                }
            };
            self.validate_document(name, &doc, &index, &mut report);
        }

        for name in index.keys() {
            if !names.contains(name) {
                report
                    .issues
                    .push(format!("Index lists theme '{}' but its file is missing", name));
            }
        }

        report.valid = report.issues.is_empty();
        if !report.valid {
            warn!("Theme validation found {} issues", report.issues.len());
        }
        Ok(report)
    }

    fn validate_document(
        &self,
        name: &str,
        doc: &Value,
        index: &BTreeMap<String, String>,
        report: &mut ValidationReport,
    ) {
        for &(field, kind) in REQUIRED_FIELDS {
            match field_state(doc, field, kind) {
                FieldState::Valid(_) => {}
                FieldState::Invalid => report.issues.push(format!(
                    "Theme '{}' field '{}' must be a {}",
                    name,
                    field,
                    kind.name()
                )),
                FieldState::Absent => report
                    .issues
                    .push(format!("Theme '{}' is missing required field '{}'", name, field)),
            }
        }
        for &(field, kind) in OPTIONAL_FIELDS {
            if field_state(doc, field, kind) == FieldState::Invalid {
                report.issues.push(format!(
                    "Theme '{}' field '{}' must be a {}",
                    name,
                    field,
                    kind.name()
                ));
            }
        }

        if let FieldState::Valid(declared) = field_state(doc, "theme", FieldKind::String) {
            if declared.as_str() != Some(name) {
                report.warnings.push(format!(
                    "Theme file '{}' declares name '{}'",
                    name,
                    declared.as_str().unwrap_or_default()
                ));
            }
        }
        if !index.contains_key(name) {
            report
                .warnings
                .push(format!("Theme '{}' is not listed in the theme index", name));
        }

        if let FieldState::Valid(links) = field_state(doc, "linkedThemes", FieldKind::Array) {
            for link in string_items(links) {
                if !index.contains_key(link) {
                    report
                        .issues
                        .push(format!("Theme '{}' links to unknown theme '{}'", name, link));
                }
            }
        }
        if let FieldState::Valid(files) = field_state(doc, "files", FieldKind::Array) {
            for file in string_items(files) {
                if !self.root.join(file).exists() {
                    report
                        .warnings
                        .push(format!("Theme '{}' references missing file '{}'", name, file));
                }
            }
        }
        if let FieldState::Valid(paths) = field_state(doc, "paths", FieldKind::Array) {
            for path in string_items(paths) {
                if !self.root.join(path).exists() {
                    report
                        .warnings
                        .push(format!("Theme '{}' references missing path '{}'", name, path));
                }
            }
        }
    }
}
