/// Tunables for discovery and context loading.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// A taxonomy theme is discovered when its score exceeds this.
    pub discovery_threshold: f64,
    /// Estimated context size above which a narrower mode is recommended.
    pub memory_ceiling_mb: u64,
    /// Files above this size contribute metadata only.
    pub max_file_size_bytes: u64,
    pub readme_max_chars: usize,
    pub max_keywords_per_file: usize,
    pub json_keyword_depth: usize,
    pub respect_gitignore: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            discovery_threshold: 0.05,
            memory_ceiling_mb: 100,
            max_file_size_bytes: 1024 * 1024,
            readme_max_chars: 2000,
            max_keywords_per_file: 200,
            json_keyword_depth: 3,
            respect_gitignore: true,
        }
    }
}
