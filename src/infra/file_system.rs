use crate::domain::errors::{Result, ThemeError};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories never walked: dependency caches, virtualenvs, build output.
pub const NOISE_DIRECTORIES: &[&str] = &[
    "node_modules",
    "bower_components",
    "jspm_packages",
    "vendor",
    "venv",
    "virtualenv",
    "__pycache__",
    "site-packages",
    "target",
    "dist",
    "build",
    "out",
    "coverage",
    "htmlcov",
    "projectManagement",
];

pub const README_FILENAMES: &[&str] = &["README.md", "readme.md", "Readme.md", "README.txt", "readme.txt"];

pub const GLOBAL_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "requirements.txt",
    "pyproject.toml",
    "setup.py",
    "Pipfile",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "composer.json",
    "Gemfile",
    "tsconfig.json",
    ".env",
    ".env.example",
    ".env.local",
    "README.md",
    "CHANGELOG.md",
    "LICENSE",
    "Dockerfile",
    "docker-compose.yml",
    "Makefile",
];

pub const GLOBAL_DIRECTORIES: &[&str] = &["src", "lib", "app"];

pub const ENTRYPOINT_GLOBS: &[&str] = &["main.*", "index.*", "app.*", "server.*"];

#[derive(Debug, Clone, PartialEq)]
pub struct WalkedDirectory {
    pub path: String,
    pub name: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkedFile {
    pub path: String,
    pub name: String,
    pub absolute: PathBuf,
    pub size: u64,
    pub depth: usize,
}

/// Directories and files of a project, relative to its root, in sorted walk order.
#[derive(Debug, Clone, Default)]
pub struct ProjectTree {
    pub directories: Vec<WalkedDirectory>,
    pub files: Vec<WalkedFile>,
}

#[derive(Debug, Clone)]
struct IgnorePattern {
    pattern: String,
    negated: bool,
}

/// Root `.gitignore` rules. A matching negated pattern always wins.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreRules {
    pub fn load(root: &Path) -> io::Result<Self> {
        let path = root.join(".gitignore");
        if !path.is_file() {
            debug!("No .gitignore file found at: {}", path.display());
            return Ok(Self::default());
        }
        let rules = Self::parse(&fs::read_to_string(&path)?);
        info!("Loaded {} patterns from .gitignore", rules.len());
        Ok(rules)
    }

    pub fn parse(text: &str) -> Self {
        let patterns = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| match line.strip_prefix('!') {
                Some(rest) => IgnorePattern {
                    pattern: rest.trim().to_string(),
                    negated: true,
                },
                None => IgnorePattern {
                    pattern: line.to_string(),
                    negated: false,
                },
            })
            .filter(|p| !p.pattern.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        let mut ignored = false;
        for rule in &self.patterns {
            if pattern_matches(rel_path, &rule.pattern, is_dir) {
                if rule.negated {
                    debug!("Path {} re-included by !{}", rel_path, rule.pattern);
                    return false;
                }
                ignored = true;
            }
        }
        ignored
    }
}

fn pattern_matches(path: &str, pattern: &str, is_dir: bool) -> bool {
    if pattern.ends_with('/') && !is_dir {
        return false;
    }
    let pattern = pattern.trim_end_matches('/');

    if let Some(anchored) = pattern.strip_prefix('/') {
        return path == anchored || path.starts_with(&format!("{}/", anchored));
    }

    if pattern.contains('*') {
        let base = path.rsplit('/').next().unwrap_or(path);
        return wildcard_matches(path, pattern) || wildcard_matches(base, pattern);
    }

    path == pattern || path.starts_with(&format!("{}/", pattern)) || path.split('/').any(|c| c == pattern)
}

fn wildcard_matches(text: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || !text.ends_with(last) || text.len() < first.len() + last.len() {
        return false;
    }

    let mut rest = &text[first.len()..text.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    true
}

pub fn is_noise_directory(name: &str) -> bool {
    name.starts_with('.') || NOISE_DIRECTORIES.contains(&name)
}

/// Root-relative path with forward slashes.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// True when `file` lies strictly below the root-relative directory `dir`.
pub fn is_under(file: &str, dir: &str) -> bool {
    let dir = dir.trim_end_matches('/');
    file.len() > dir.len() && file.starts_with(dir) && file.as_bytes()[dir.len()] == b'/'
}

/// Walks the project once in sorted order, pruning noise directories and
/// ignored paths. Unreadable entries are skipped; only an unreadable root
/// is an error.
pub fn walk_project(root: &Path, respect_gitignore: bool) -> Result<ProjectTree> {
    if let Err(e) = fs::read_dir(root) {
        warn!("Cannot list project root {}: {}", root.display(), e);
        return Err(ThemeError::InvalidProjectRoot(root.to_path_buf()));
    }
    info!("Walking project tree at: {}", root.display());

    let rules = if respect_gitignore {
        IgnoreRules::load(root).unwrap_or_else(|e| {
            warn!("Failed to read .gitignore: {}", e);
            IgnoreRules::default()
        })
    } else {
        IgnoreRules::default()
    };

    let keep = |entry: &DirEntry| {
        if entry.depth() == 0 {
            return true;
        }
        let is_dir = entry.file_type().is_dir();
        if is_dir && is_noise_directory(&entry.file_name().to_string_lossy()) {
            return false;
        }
        !rules.is_ignored(&relative_path(root, entry.path()), is_dir)
    };

    let mut tree = ProjectTree::default();
    for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(keep) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let path = relative_path(root, entry.path());
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.file_type().is_dir() {
            tree.directories.push(WalkedDirectory {
                path,
                name,
                depth: entry.depth(),
            });
        } else if entry.file_type().is_file() {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            tree.files.push(WalkedFile {
                path,
                name,
                absolute: entry.path().to_path_buf(),
                size,
                depth: entry.depth(),
            });
        }
    }

    info!(
        "Found {} directories and {} files",
        tree.directories.len(),
        tree.files.len()
    );
    Ok(tree)
}

/// Reads a UTF-8 file, returning `None` when it exceeds `max_bytes`.
pub fn read_file_contents(path: &Path, max_bytes: u64) -> io::Result<Option<String>> {
    let metadata = path.metadata()?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a file"));
    }
    if metadata.len() > max_bytes {
        debug!(
            "Skipping content of large file {} ({} bytes > {})",
            path.display(),
            metadata.len(),
            max_bytes
        );
        return Ok(None);
    }
    if metadata.len() == 0 {
        return Ok(Some(String::new()));
    }

    let mut file = fs::File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    debug!("Read {} bytes from {}", contents.len(), path.display());
    Ok(Some(contents))
}

pub fn find_readme(dir: &Path) -> Option<PathBuf> {
    README_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedReadme {
    pub path: PathBuf,
    pub content: String,
}

/// First README in priority order, truncated to `max_chars` characters.
pub fn read_readme(dir: &Path, max_chars: usize) -> Option<LoadedReadme> {
    let path = find_readme(dir)?;
    match fs::read_to_string(&path) {
        Ok(content) => {
            let content = if content.chars().count() > max_chars {
                content.chars().take(max_chars).collect()
            } else {
                content
            };
            Some(LoadedReadme { path, content })
        }
        Err(e) => {
            warn!("Failed to read README {}: {}", path.display(), e);
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalPaths {
    pub files: Vec<String>,
    pub directories: Vec<String>,
}

/// Conventional manifests, env files, root docs, source roots and entrypoints
/// that exist at the project root.
pub fn probe_global_paths(root: &Path) -> GlobalPaths {
    let mut global = GlobalPaths::default();

    for name in GLOBAL_FILES {
        if root.join(name).is_file() {
            global.files.push(name.to_string());
        }
    }
    for name in GLOBAL_DIRECTORIES {
        if root.join(name).is_dir() {
            global.directories.push(name.to_string());
        }
    }

    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    for pattern in ENTRYPOINT_GLOBS {
        let full = format!("{}/{}", escaped_root, pattern);
        let Ok(paths) = glob::glob(&full) else {
            continue;
        };
        for path in paths.filter_map(|p| p.ok()).filter(|p| p.is_file()) {
            let rel = relative_path(root, &path);
            if !global.files.contains(&rel) {
                global.files.push(rel);
            }
        }
    }

    debug!(
        "Global paths: {} files, {} directories",
        global.files.len(),
        global.directories.len()
    );
    global
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(path).unwrap();
        write!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_read_file_contents() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "test.txt", "Test content\n");

        let contents = read_file_contents(&temp_dir.path().join("test.txt"), 1024).unwrap();
        assert_eq!(contents.as_deref(), Some("Test content\n"));
    }

    #[test]
    fn test_read_file_contents_over_limit_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "big.txt", "0123456789");

        let contents = read_file_contents(&temp_dir.path().join("big.txt"), 5).unwrap();
        assert_eq!(contents, None);
        assert!(read_file_contents(&temp_dir.path().join("missing.txt"), 5).is_err());
    }

    #[test]
    fn test_ignore_rules_parse() {
        let rules = IgnoreRules::parse("# Comment line\nnode_modules/\n*.log\n\nbuild\n/dist\n!important.log\n");
        assert_eq!(rules.len(), 5);
    }

    #[test]
    fn test_pattern_matches() {
        assert!(pattern_matches("test.log", "*.log", false));
        assert!(pattern_matches("logs/test.log", "*.log", false));
        assert!(pattern_matches("node_modules", "node_modules/", true));
        assert!(!pattern_matches("node_modules.txt", "node_modules/", false));
        assert!(pattern_matches("dist/main.js", "/dist", false));
        assert!(!pattern_matches("src/dist/main.js", "/dist", false));
        assert!(pattern_matches("temporary.txt", "temp*", false));
        assert!(pattern_matches("src/temp.rs", "temp*", false));
        assert!(pattern_matches("abc.xyz", "*.xy*", false));
        assert!(pattern_matches("a/b/c.txt", "**/c.txt", false));
        assert!(pattern_matches("src/build/out.js", "build", false));
        assert!(!pattern_matches("src/rebuild.rs", "build", false));
    }

    #[test]
    fn test_negated_rule_wins() {
        let rules = IgnoreRules::parse("*.log\n!important.log\n");
        assert!(rules.is_ignored("logs/server.log", false));
        assert!(!rules.is_ignored("logs/important.log", false));
        assert!(!rules.is_ignored("src/index.js", false));
    }

    #[test]
    fn test_walk_project_skips_noise_and_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "src/auth/login.js", "export {}");
        touch(root, "node_modules/react/index.js", "");
        touch(root, ".git/config", "");
        touch(root, "logs/app.log", "");
        touch(root, ".gitignore", "logs/\n");

        let tree = walk_project(root, true).unwrap();
        let files: Vec<&str> = tree.files.iter().map(|f| f.path.as_str()).collect();
        let dirs: Vec<&str> = tree.directories.iter().map(|d| d.path.as_str()).collect();

        assert_eq!(files, vec![".gitignore", "src/auth/login.js"]);
        assert_eq!(dirs, vec!["src", "src/auth"]);
        assert_eq!(tree.files[1].depth, 3);

        let unfiltered = walk_project(root, false).unwrap();
        assert!(unfiltered.files.iter().any(|f| f.path == "logs/app.log"));
    }

    #[test]
    fn test_is_under() {
        assert!(is_under("src/auth/login.ts", "src/auth"));
        assert!(is_under("src/auth/login.ts", "src/auth/"));
        assert!(!is_under("src/authz/policy.ts", "src/auth"));
        assert!(!is_under("src/auth", "src/auth"));
    }

    #[test]
    fn test_walk_project_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(matches!(
            walk_project(&missing, true),
            Err(ThemeError::InvalidProjectRoot(_))
        ));
    }

    #[test]
    fn test_read_readme_priority_and_truncation() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "docs/readme.txt", "second choice");
        touch(root, "docs/README.md", &"x".repeat(50));

        let readme = read_readme(&root.join("docs"), 10).unwrap();
        assert!(readme.path.ends_with("README.md"));
        assert_eq!(readme.content.len(), 10);

        assert!(read_readme(root, 10).is_none());
    }

    #[test]
    fn test_probe_global_paths() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "package.json", "{}");
        touch(root, "index.js", "");
        touch(root, "src/app.js", "");
        touch(root, "notes.md", "");

        let global = probe_global_paths(root);
        assert_eq!(global.files, vec!["package.json".to_string(), "index.js".to_string()]);
        assert_eq!(global.directories, vec!["src".to_string()]);
    }
}
