pub mod context_generator;
pub mod file_analyzer;
pub mod scope_engine;
pub mod taxonomy;
pub mod theme_discovery;
