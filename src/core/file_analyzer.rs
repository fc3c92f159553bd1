use crate::core::taxonomy::THEME_TAXONOMY;
use crate::domain::models::{DirectoryPurpose, FileRecord, FileType};
use log::debug;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

const LANGUAGES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("rs", "rust"),
    ("go", "go"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("rb", "ruby"),
    ("php", "php"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("swift", "swift"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("less", "less"),
    ("sql", "sql"),
    ("sh", "shell"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("md", "markdown"),
];

const CONFIG_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "toml", "ini", "cfg", "conf", "env", "lock", "xml"];
const DOC_EXTENSIONS: &[&str] = &["md", "rst", "txt", "adoc"];
const DATABASE_EXTENSIONS: &[&str] = &["sql", "db", "sqlite", "sqlite3", "prisma"];
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "bmp", "webp", "pdf", "zip", "gz", "tar", "tgz", "7z",
    "exe", "dll", "so", "dylib", "a", "o", "class", "jar", "pyc", "woff", "woff2", "ttf", "eot",
    "mp3", "mp4", "mov", "avi", "wasm", "bin",
];

const KEYWORD_STOP_LIST: &[&str] = &[
    "the", "and", "for", "are", "not", "with", "from", "this", "that", "self", "none", "null",
    "true", "false", "return", "import", "export", "default", "const", "let", "var", "function",
    "class", "def", "new", "public", "private", "protected", "static", "void", "int", "string",
    "use", "mod", "pub", "struct", "impl", "enum", "else", "elif", "while", "async", "await",
    "type", "interface", "package", "require", "module", "extends", "implements", "try", "catch",
    "except", "raise", "throw", "lambda", "yield", "pass", "break", "continue", "match", "case",
    "undefined", "bool", "str", "vec", "let", "mut", "fn", "any", "object", "value", "data",
];

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]{2,}").expect("identifier pattern"));
static JS_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:[\w*{}\s,$]+\s+from\s+)?['"]([^'"]+)['"]"#).expect("js import pattern")
});
static JS_REQUIRE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).expect("require pattern"));
static PY_FROM_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import\b").expect("python from pattern"));
static PY_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*import\s+([\w.]+)").expect("python import pattern"));
static RUST_USE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:pub(?:\([\w:]+\))?\s+)?use\s+([\w:]+)").expect("rust use pattern"));
static RUST_MOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:pub\s+)?mod\s+(\w+)\s*;").expect("rust mod pattern"));
static GO_IMPORT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)import\s*\((.*?)\)").expect("go block pattern"));
static GO_IMPORT_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*import\s+(?:\w+\s+)?"([^"]+)""#).expect("go import pattern"));
static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("quoted pattern"));
static JVM_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([\w.]+)").expect("jvm import pattern"));

pub fn language_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_lowercase();
    LANGUAGES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, language)| *language)
}

pub fn is_binary_extension(extension: &str) -> bool {
    BINARY_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

pub fn classify_file_type(file_name: &str, extension: &str) -> FileType {
    let name = file_name.to_lowercase();
    let extension = extension.to_lowercase();

    if name.starts_with(".git") {
        return FileType::Vcs;
    }
    if name == "dockerfile"
        || name.starts_with("docker-compose")
        || name == "procfile"
        || name == "jenkinsfile"
        || extension == "tf"
    {
        return FileType::Deployment;
    }
    if DATABASE_EXTENSIONS.contains(&extension.as_str()) {
        return FileType::Database;
    }
    if DOC_EXTENSIONS.contains(&extension.as_str()) {
        return FileType::Documentation;
    }
    if CONFIG_EXTENSIONS.contains(&extension.as_str()) || name.starts_with(".env") {
        return FileType::Config;
    }
    if language_for_extension(&extension).is_some() {
        return FileType::Source;
    }
    FileType::Unknown
}

fn push_captures(re: &Regex, text: &str, out: &mut Vec<String>) {
    for caps in re.captures_iter(text) {
        out.push(caps[1].to_string());
    }
}

/// Best-effort module references; never authoritative.
pub fn extract_imports(content: &str, language: &str) -> Vec<String> {
    let mut imports = Vec::new();

    match language {
        "javascript" | "typescript" | "vue" | "svelte" => {
            push_captures(&JS_IMPORT, content, &mut imports);
            push_captures(&JS_REQUIRE, content, &mut imports);
        }
        "python" => {
            push_captures(&PY_FROM_IMPORT, content, &mut imports);
            push_captures(&PY_IMPORT, content, &mut imports);
        }
        "rust" => {
            push_captures(&RUST_USE, content, &mut imports);
            push_captures(&RUST_MOD, content, &mut imports);
        }
        "go" => {
            for block in GO_IMPORT_BLOCK.captures_iter(content) {
                push_captures(&QUOTED, &block[1], &mut imports);
            }
            push_captures(&GO_IMPORT_SINGLE, content, &mut imports);
        }
        "java" | "kotlin" => push_captures(&JVM_IMPORT, content, &mut imports),
        _ => {}
    }

    let mut seen = BTreeSet::new();
    imports.retain(|import| seen.insert(import.clone()));
    imports
}

/// Splits an identifier on underscores, hyphens, digits and lower-to-upper
/// case transitions, returning lowercase parts.
pub fn split_identifier(identifier: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in identifier.chars() {
        if !ch.is_ascii_alphabetic() {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_ascii_lowercase();
        current.push(ch.to_ascii_lowercase());
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn is_keyword_candidate(token: &str) -> bool {
    token.len() >= 3 && !KEYWORD_STOP_LIST.contains(&token)
}

fn add_token(keywords: &mut BTreeMap<String, usize>, token: &str) -> bool {
    if !is_keyword_candidate(token) {
        return false;
    }
    *keywords.entry(token.to_string()).or_insert(0) += 1;
    true
}

/// Harvests at most `limit` keyword tokens from identifiers in `content`.
pub fn extract_keywords(content: &str, limit: usize) -> BTreeMap<String, usize> {
    let mut keywords = BTreeMap::new();
    let mut harvested = 0;

    'outer: for identifier in IDENTIFIER.find_iter(content) {
        for part in split_identifier(identifier.as_str()) {
            if harvested >= limit {
                break 'outer;
            }
            if is_keyword_candidate(&part) {
                add_token(&mut keywords, &part);
                harvested += 1;
            }
        }
    }
    keywords
}

/// Tokens from the file's name, so empty or unreadable files still carry a signal.
pub fn file_name_keywords(file_name: &str) -> Vec<String> {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    split_identifier(stem)
        .into_iter()
        .filter(|t| is_keyword_candidate(t))
        .collect()
}

/// Collects object keys (and short string values) from a JSON document,
/// descending at most `depth` levels and harvesting at most `limit` tokens.
pub fn extract_json_keywords(value: &serde_json::Value, depth: usize, limit: usize) -> BTreeMap<String, usize> {
    let mut keywords = BTreeMap::new();
    let mut remaining = limit;
    visit_json(value, depth, &mut remaining, &mut keywords);
    keywords
}

fn add_parts(text: &str, remaining: &mut usize, keywords: &mut BTreeMap<String, usize>) {
    for part in split_identifier(text) {
        if *remaining == 0 {
            return;
        }
        if add_token(keywords, &part) {
            *remaining -= 1;
        }
    }
}

fn visit_json(
    value: &serde_json::Value,
    depth: usize,
    remaining: &mut usize,
    keywords: &mut BTreeMap<String, usize>,
) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                if *remaining == 0 {
                    return;
                }
                add_parts(key, remaining, keywords);
                if depth > 0 {
                    visit_json(child, depth - 1, remaining, keywords);
                }
            }
        }
        serde_json::Value::Array(items) => {
            if depth > 0 {
                for item in items {
                    if *remaining == 0 {
                        return;
                    }
                    visit_json(item, depth - 1, remaining, keywords);
                }
            }
        }
        serde_json::Value::String(s) if s.len() <= 40 && !s.contains(char::is_whitespace) => {
            add_parts(s, remaining, keywords);
        }
        _ => {}
    }
}

pub fn is_known_framework(name: &str) -> bool {
    THEME_TAXONOMY
        .iter()
        .flat_map(|category| category.themes.iter())
        .any(|rule| rule.frameworks.contains(&name))
}

/// Normalizes a package or import reference to a framework identifier
/// candidate: `@nestjs/core` -> `nestjs`, `flask.views` -> `flask`.
fn package_root(reference: &str) -> String {
    let reference = reference.trim().to_lowercase();
    let reference = reference.trim_start_matches('@');
    let root = reference
        .split(['/', '.', ':'])
        .next()
        .unwrap_or(reference);
    root.replace('_', "-")
}

fn manifest_dependencies(file_name: &str, content: &str) -> Vec<String> {
    match file_name {
        "package.json" => {
            let Ok(value) = serde_json::from_str::<serde_json::Value>(content) else {
                return Vec::new();
            };
            ["dependencies", "devDependencies", "peerDependencies"]
                .iter()
                .filter_map(|section| value.get(section).and_then(|v| v.as_object()))
                .flat_map(|deps| deps.keys().cloned())
                .collect()
        }
        "requirements.txt" => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                line.split(|c: char| "=<>~![; ".contains(c))
                    .next()
                    .unwrap_or(line)
                    .to_string()
            })
            .collect(),
        "Cargo.toml" | "pyproject.toml" | "go.mod" => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#') && !line.starts_with('['))
            .filter_map(|line| {
                let token = line.split(['=', ' ', '"', '>', '<']).find(|t| !t.is_empty())?;
                Some(token.to_string())
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn detect_frameworks(file_name: &str, extension: &str, content: &str, imports: &[String]) -> BTreeSet<String> {
    let mut frameworks = BTreeSet::new();

    match extension {
        "jsx" | "tsx" => {
            frameworks.insert("react".to_string());
        }
        "vue" => {
            frameworks.insert("vue".to_string());
        }
        "svelte" => {
            frameworks.insert("svelte".to_string());
        }
        _ => {}
    }
    if file_name.eq_ignore_ascii_case("dockerfile") || file_name.starts_with("docker-compose") {
        frameworks.insert("docker".to_string());
    }

    for reference in imports
        .iter()
        .cloned()
        .chain(manifest_dependencies(file_name, content))
    {
        if reference.starts_with('.') {
            continue;
        }
        let full = reference.trim().to_lowercase();
        if is_known_framework(&full) {
            frameworks.insert(full);
            continue;
        }
        let root = package_root(&reference);
        if is_known_framework(&root) {
            frameworks.insert(root);
        }
    }

    frameworks
}

/// Builds a record for a file whose content was read successfully.
pub fn analyze_content(
    path: &str,
    file_name: &str,
    size: u64,
    content: &str,
    max_keywords: usize,
    json_depth: usize,
) -> FileRecord {
    let extension = extension_of(file_name);
    let language = language_for_extension(&extension);
    let file_type = classify_file_type(file_name, &extension);

    let imports = language
        .map(|lang| extract_imports(content, lang))
        .unwrap_or_default();

    let mut keywords = if extension == "json" {
        serde_json::from_str::<serde_json::Value>(content)
            .map(|value| extract_json_keywords(&value, json_depth, max_keywords))
            .unwrap_or_default()
    } else {
        extract_keywords(content, max_keywords)
    };
    for token in file_name_keywords(file_name) {
        *keywords.entry(token).or_insert(0) += 1;
    }

    let frameworks = detect_frameworks(file_name, &extension, content, &imports);
    debug!(
        "Analyzed {}: {} imports, {} keywords, {} frameworks",
        path,
        imports.len(),
        keywords.len(),
        frameworks.len()
    );

    FileRecord {
        path: path.to_string(),
        extension,
        language,
        file_type,
        size,
        analyzed: true,
        imports,
        keywords,
        frameworks,
    }
}

/// Builds a record for a file that is binary, too large or unreadable.
pub fn metadata_record(path: &str, file_name: &str, size: u64) -> FileRecord {
    let extension = extension_of(file_name);
    let file_type = classify_file_type(file_name, &extension);
    let mut record = FileRecord::metadata_only(path.to_string(), extension.clone(), file_type, size);
    record.language = language_for_extension(&extension);
    for token in file_name_keywords(file_name) {
        *record.keywords.entry(token).or_insert(0) += 1;
    }
    record
}

pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

const PURPOSE_PATTERNS: &[(&str, &[&str])] = &[
    ("testing", &["test", "tests", "spec", "specs", "__tests__", "e2e"]),
    ("ui", &["components", "views", "pages", "ui", "widgets", "layouts"]),
    ("api", &["api", "routes", "controllers", "handlers", "endpoints"]),
    ("data", &["models", "schemas", "entities", "db", "database", "migrations"]),
    ("configuration", &["config", "configs", "settings"]),
    ("documentation", &["docs", "doc", "documentation"]),
    ("utilities", &["utils", "helpers", "lib", "common", "shared"]),
    ("styling", &["styles", "css", "scss", "sass"]),
    ("assets", &["assets", "static", "public", "images"]),
];

fn is_test_file(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains(".test.") || name.contains(".spec.") || name.contains("_test.") || name.starts_with("test_")
}

fn is_style_file(name: &str) -> bool {
    matches!(extension_of(name).as_str(), "css" | "scss" | "sass" | "less")
}

/// Guesses what a directory is for from its name, then from the files it
/// directly contains.
pub fn classify_directory(path: &str, name: &str, file_names: &[String]) -> DirectoryPurpose {
    let lowered = name.to_lowercase();
    for &(category, names) in PURPOSE_PATTERNS {
        if names.contains(&lowered.as_str()) {
            return DirectoryPurpose {
                path: path.to_string(),
                category,
                confidence: 0.8,
                indicators: vec![format!("name:{}", lowered)],
            };
        }
    }

    if !file_names.is_empty() {
        let total = file_names.len() as f64;
        let tests = file_names.iter().filter(|n| is_test_file(n)).count();
        let styles = file_names.iter().filter(|n| is_style_file(n)).count();

        if tests as f64 / total > 0.5 {
            return DirectoryPurpose {
                path: path.to_string(),
                category: "testing",
                confidence: 0.6,
                indicators: vec![format!("test-files:{}", tests)],
            };
        }
        if styles as f64 / total > 0.5 {
            return DirectoryPurpose {
                path: path.to_string(),
                category: "styling",
                confidence: 0.6,
                indicators: vec![format!("style-files:{}", styles)],
            };
        }
    }

    DirectoryPurpose {
        path: path.to_string(),
        category: "general",
        confidence: 0.1,
        indicators: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_and_file_type() {
        assert_eq!(language_for_extension("TSX"), Some("typescript"));
        assert_eq!(language_for_extension("xyz"), None);
        assert_eq!(classify_file_type("Dockerfile", ""), FileType::Deployment);
        assert_eq!(classify_file_type(".gitignore", ""), FileType::Vcs);
        assert_eq!(classify_file_type("schema.sql", "sql"), FileType::Database);
        assert_eq!(classify_file_type("README.md", "md"), FileType::Documentation);
        assert_eq!(classify_file_type("package.json", "json"), FileType::Config);
        assert_eq!(classify_file_type("main.rs", "rs"), FileType::Source);
        assert_eq!(classify_file_type("blob.xyz", "xyz"), FileType::Unknown);
    }

    #[test]
    fn test_extract_js_imports() {
        let content = r#"
import React from 'react';
import { login } from "./auth/login";
import './styles.css';
const express = require('express');
"#;
        let imports = extract_imports(content, "javascript");
        assert_eq!(imports, vec!["react", "./auth/login", "./styles.css", "express"]);
    }

    #[test]
    fn test_extract_python_rust_go_imports() {
        let py = "from flask import Flask\nimport os.path\n";
        assert_eq!(extract_imports(py, "python"), vec!["flask", "os.path"]);

        let rs = "use crate::auth::session;\npub mod routes;\n";
        assert_eq!(extract_imports(rs, "rust"), vec!["crate::auth::session", "routes"]);

        let go = "import (\n    \"fmt\"\n    web \"net/http\"\n)\n";
        assert_eq!(extract_imports(go, "go"), vec!["fmt", "net/http"]);
    }

    #[test]
    fn test_split_identifier() {
        assert_eq!(split_identifier("LoginForm"), vec!["login", "form"]);
        assert_eq!(split_identifier("user_profile2Id"), vec!["user", "profile", "id"]);
        assert_eq!(split_identifier("HTTPServer"), vec!["httpserver"]);
    }

    #[test]
    fn test_extract_keywords_is_bounded_and_filtered() {
        let content = "function validatePassword(password) { return checkPassword(password); }";
        let keywords = extract_keywords(content, 100);
        assert_eq!(keywords.get("password"), Some(&4));
        assert!(!keywords.contains_key("function"));
        assert!(!keywords.contains_key("return"));

        let bounded = extract_keywords(content, 2);
        assert_eq!(bounded.values().sum::<usize>(), 2);
    }

    #[test]
    fn test_json_keywords_respect_depth() {
        let value: serde_json::Value =
            serde_json::from_str(r#"{"authConfig": {"tokenTtl": {"deepSecret": 1}}}"#).unwrap();

        let shallow = extract_json_keywords(&value, 1, 100);
        assert!(shallow.contains_key("auth"));
        assert!(shallow.contains_key("token"));
        assert!(!shallow.contains_key("deep"));

        let deep = extract_json_keywords(&value, 3, 100);
        assert!(deep.contains_key("deep"));
    }

    #[test]
    fn test_json_keywords_are_bounded_per_file() {
        let entries: Vec<String> = (0..500)
            .map(|i| format!("\"package{}\": {{\"version\": \"1.0.{}\", \"resolved\": \"registry\"}}", i, i))
            .collect();
        let raw = format!("{{\"packages\": {{{}}}}}", entries.join(", "));

        let record = analyze_content("package-lock.json", "package-lock.json", raw.len() as u64, &raw, 200, 3);
        let harvested: usize = record.keywords.values().sum();
        let name_tokens = file_name_keywords("package-lock.json").len();
        assert!(harvested <= 200 + name_tokens, "harvested {}", harvested);

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(extract_json_keywords(&value, 3, 200).values().sum::<usize>(), 200);
    }

    #[test]
    fn test_detect_frameworks_from_imports_and_manifests() {
        let imports = vec!["react".to_string(), "@nestjs/core".to_string(), "./local".to_string()];
        let frameworks = detect_frameworks("app.ts", "ts", "", &imports);
        assert!(frameworks.contains("react"));
        assert!(frameworks.contains("nestjs"));

        let manifest = r#"{"dependencies": {"express": "^4", "left-pad": "1"}, "devDependencies": {"jest": "29"}}"#;
        let frameworks = detect_frameworks("package.json", "json", manifest, &[]);
        assert_eq!(
            frameworks.into_iter().collect::<Vec<_>>(),
            vec!["express".to_string(), "jest".to_string()]
        );

        let requirements = "Django>=4.0\npytest==7.1\n# comment\n";
        let frameworks = detect_frameworks("requirements.txt", "txt", requirements, &[]);
        assert!(frameworks.contains("django"));
        assert!(frameworks.contains("pytest"));

        let frameworks = detect_frameworks("LoginForm.jsx", "jsx", "", &[]);
        assert!(frameworks.contains("react"));
    }

    #[test]
    fn test_analyze_content_and_metadata_record() {
        let record = analyze_content(
            "src/auth/login.js",
            "login.js",
            42,
            "import jwt from 'jsonwebtoken';\nexport function login(user, password) {}",
            200,
            3,
        );
        assert!(record.analyzed);
        assert_eq!(record.language, Some("javascript"));
        assert_eq!(record.imports, vec!["jsonwebtoken"]);
        assert!(record.frameworks.contains("jsonwebtoken"));
        assert!(record.keywords.contains_key("login"));

        let meta = metadata_record("assets/logo.png", "logo.png", 4096);
        assert!(!meta.analyzed);
        assert!(meta.imports.is_empty());
        assert!(meta.keywords.contains_key("logo"));
    }

    #[test]
    fn test_classify_directory() {
        let by_name = classify_directory("src/components", "components", &[]);
        assert_eq!(by_name.category, "ui");
        assert_eq!(by_name.confidence, 0.8);

        let files = vec!["a.test.js".to_string(), "b.spec.js".to_string(), "c.js".to_string()];
        let by_files = classify_directory("src/checks", "checks", &files);
        assert_eq!(by_files.category, "testing");

        let general = classify_directory("src/misc", "misc", &["x.js".to_string()]);
        assert_eq!(general.category, "general");
    }
}
