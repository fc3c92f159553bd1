use crate::core::context_generator::{build_context_output, format_output};
use crate::core::scope_engine::ScopeEngine;
use crate::core::theme_discovery::ThemeDiscovery;
use crate::domain::config::EngineConfig;
use crate::domain::models::{ContextMode, ThemeUpdate};
use crate::infra::logger::{print_welcome_message, setup_logger};
use crate::infra::output::write_output;
use crate::infra::theme_store::ThemeStore;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "theme-scope")]
#[command(about = "Discover project themes and load theme-scoped context", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root
    #[arg(long, global = true, default_value = ".")]
    pub path: PathBuf,

    /// Minimum taxonomy score for a theme to be discovered
    #[arg(long, global = true)]
    pub threshold: Option<f64>,

    /// Estimated context size (MB) above which a narrower mode is recommended
    #[arg(long, global = true)]
    pub memory_ceiling: Option<u64>,

    /// Walk files listed in .gitignore too
    #[arg(long, global = true)]
    pub no_gitignore: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Emit JSON instead of the rendered context block
    #[arg(long)]
    pub json: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub clipboard: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the project and persist discovered themes
    Discover {
        /// Overwrite existing theme files
        #[arg(long)]
        force: bool,

        #[arg(long)]
        json: bool,
    },
    /// Load the context for a theme
    Context {
        theme: String,

        #[arg(long, default_value = "focused")]
        mode: ContextMode,

        /// Keep the requested mode even for highly connected themes
        #[arg(long)]
        force_mode: bool,

        /// Task description used to rank files by relevance
        #[arg(long)]
        task: Option<String>,

        /// Also probe the loaded context for stale entries
        #[arg(long)]
        check: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Ask whether an issue needs a broader context than the current mode
    Escalate {
        theme: String,

        #[arg(long, default_value = "focused")]
        mode: ContextMode,

        #[arg(long)]
        issue: String,
    },
    /// Check persisted theme files for structural problems
    Validate {
        #[arg(long)]
        json: bool,
    },
    /// List persisted themes
    Themes,
    /// Create a user-defined theme
    Create {
        name: String,

        #[arg(long)]
        description: String,

        #[arg(long = "dir")]
        paths: Vec<String>,

        #[arg(long = "file")]
        files: Vec<String>,
    },
    /// Update fields of an existing theme
    Update {
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long = "dir")]
        paths: Vec<String>,

        #[arg(long = "file")]
        files: Vec<String>,

        #[arg(long = "link")]
        linked_themes: Vec<String>,
    },
    /// Delete a theme file and its index entry
    Delete { name: String },
}

impl Cli {
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            discovery_threshold: self.threshold.unwrap_or(defaults.discovery_threshold),
            memory_ceiling_mb: self.memory_ceiling.unwrap_or(defaults.memory_ceiling_mb),
            respect_gitignore: !self.no_gitignore,
            ..defaults
        }
    }
}

fn non_empty(values: Vec<String>) -> Option<BTreeSet<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.into_iter().collect())
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;
    if cli.verbose > 0 {
        print_welcome_message()?;
    }

    execute(cli)
}

pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.engine_config();
    let root = cli.path.clone();
    debug!("Project root {}, config {:?}", root.display(), config);
    let store = ThemeStore::new(&root);

    match cli.command {
        Commands::Discover { force, json } => {
            info!("Starting discover command");
            let discovery = ThemeDiscovery::new(config);
            let result = discovery
                .discover_themes(&root)
                .with_context(|| format!("Theme discovery failed for {}", root.display()))?;
            let written = store.persist_discovery(&result, force)?;

            if json {
                write_output(&serde_json::to_string_pretty(&result)?, None, false)?;
            } else {
                let mut summary = format!(
                    "Discovered {} themes ({}), wrote {}:\n",
                    result.themes.len(),
                    result.metadata.discovery_method,
                    written.len()
                );
                for (name, theme) in &result.themes {
                    summary.push_str(&format!(
                        "  {} [{}] confidence {:.2}, {} files\n",
                        name,
                        theme.category,
                        theme.confidence,
                        theme.files.len()
                    ));
                }
                write_output(summary.trim_end(), None, false)?;
            }
        }
        Commands::Context {
            theme,
            mode,
            force_mode,
            task,
            check,
            output,
        } => {
            info!("Starting context command");
            let engine = ScopeEngine::new(config);
            let context = engine
                .load_context(&root, &theme, mode, force_mode)
                .with_context(|| format!("Failed to load context for theme '{}'", theme))?;
            let integrity = check.then(|| engine.validate_context_integrity(&root, &context));

            let rendered = if output.json {
                let mut value = serde_json::to_value(&context)?;
                if let Some(task) = &task {
                    value["relevantFiles"] = serde_json::to_value(engine.filter_files_by_relevance(&context, task))?;
                }
                if let Some(report) = &integrity {
                    value["integrity"] = serde_json::to_value(report)?;
                }
                serde_json::to_string_pretty(&value)?
            } else {
                let files = match &task {
                    Some(task) => engine.filter_files_by_relevance(&context, task),
                    None => context.files.clone(),
                };
                let mut rendered = format_output(&build_context_output(&context, &files, task.clone()));
                if let Some(report) = &integrity {
                    rendered.push_str(&format!(
                        "\n\n<integrity valid=\"{}\">\n{}</integrity>",
                        report.valid,
                        report
                            .errors
                            .iter()
                            .chain(&report.warnings)
                            .map(|line| format!("- {}\n", line))
                            .collect::<String>()
                    ));
                }
                rendered
            };
            write_output(&rendered, output.output.as_ref(), output.clipboard)?;
        }
        Commands::Escalate { theme, mode, issue } => {
            info!("Starting escalate command");
            let engine = ScopeEngine::new(config);
            let context = engine.load_context(&root, &theme, mode, true)?;
            let assessment = engine.assess_context_escalation(&context, &issue);
            write_output(&serde_json::to_string_pretty(&assessment)?, None, false)?;
        }
        Commands::Validate { json } => {
            info!("Starting validate command");
            let report = store.validate_themes()?;
            if json {
                write_output(&serde_json::to_string_pretty(&report)?, None, false)?;
            } else {
                let mut summary = format!(
                    "{} themes checked: {}\n",
                    report.themes_checked,
                    if report.valid { "valid" } else { "invalid" }
                );
                for issue in &report.issues {
                    summary.push_str(&format!("  error: {}\n", issue));
                }
                for warning in &report.warnings {
                    summary.push_str(&format!("  warning: {}\n", warning));
                }
                write_output(summary.trim_end(), None, false)?;
            }
            if !report.valid {
                anyhow::bail!("{} theme validation issues", report.issues.len());
            }
        }
        Commands::Themes => {
            let index = store.list_themes()?;
            let listing: String = index
                .iter()
                .map(|(name, description)| format!("{}: {}\n", name, description))
                .collect();
            write_output(listing.trim_end(), None, false)?;
        }
        Commands::Create {
            name,
            description,
            paths,
            files,
        } => {
            let theme = store.create_theme(
                &name,
                &description,
                paths.into_iter().collect(),
                files.into_iter().collect(),
            )?;
            write_output(&format!("Created theme '{}'", theme.name), None, false)?;
        }
        Commands::Update {
            name,
            description,
            paths,
            files,
            linked_themes,
        } => {
            let update = ThemeUpdate {
                description,
                paths: non_empty(paths),
                files: non_empty(files),
                linked_themes: non_empty(linked_themes),
                ..ThemeUpdate::default()
            };
            let theme = store.update_theme(&name, update)?;
            write_output(&format!("Updated theme '{}'", theme.name), None, false)?;
        }
        Commands::Delete { name } => {
            store.delete_theme(&name)?;
            write_output(&format!("Deleted theme '{}'", name), None, false)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["theme-scope"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_parsing() {
        let cli = parse(&[
            "context",
            "auth",
            "--mode",
            "expanded",
            "--force-mode",
            "--task",
            "fix login",
            "--path",
            "./demo",
            "--threshold",
            "0.2",
            "-vv",
        ]);

        assert_eq!(cli.path, PathBuf::from("./demo"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.engine_config().discovery_threshold, 0.2);
        assert!(cli.engine_config().respect_gitignore);
        match cli.command {
            Commands::Context {
                theme,
                mode,
                force_mode,
                task,
                output,
                ..
            } => {
                assert_eq!(theme, "auth");
                assert_eq!(mode, ContextMode::ThemeExpanded);
                assert!(force_mode);
                assert_eq!(task.as_deref(), Some("fix login"));
                assert!(!output.json);
            }
            _ => panic!("expected context command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["theme-scope", "context", "auth", "--mode", "sideways"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_engine_config_from_flags() {
        let cli = parse(&["discover", "--memory-ceiling", "5", "--no-gitignore"]);
        let config = cli.engine_config();

        assert_eq!(config.memory_ceiling_mb, 5);
        assert!(!config.respect_gitignore);
        assert_eq!(config.discovery_threshold, EngineConfig::default().discovery_threshold);
    }

    #[test]
    fn test_discover_then_context_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "src/auth/login.js", "export function login(session) { return token }");
        touch(root, "src/components/LoginForm.jsx", "import React from 'react'");
        let root_arg = root.to_string_lossy().to_string();

        execute(parse(&["discover", "--path", &root_arg])).unwrap();
        let store = ThemeStore::new(root);
        assert!(store.theme_exists("authentication"));

        let out = root.join("context.txt");
        let out_arg = out.to_string_lossy().to_string();
        execute(parse(&[
            "context",
            "authentication",
            "--path",
            &root_arg,
            "--output",
            &out_arg,
        ]))
        .unwrap();

        let rendered = fs::read_to_string(out).unwrap();
        assert!(rendered.starts_with("<context>\ntheme: authentication\n"));
        assert!(rendered.contains("login.js"));
    }

    #[test]
    fn test_create_update_delete_commands() {
        let temp_dir = TempDir::new().unwrap();
        let root_arg = temp_dir.path().to_string_lossy().to_string();

        execute(parse(&[
            "create",
            "billing",
            "--description",
            "Billing flows",
            "--dir",
            "src/billing",
            "--path",
            &root_arg,
        ]))
        .unwrap();
        execute(parse(&["update", "billing", "--link", "auth", "--path", &root_arg])).unwrap();

        let store = ThemeStore::new(temp_dir.path());
        let theme = store.load_theme("billing").unwrap();
        assert_eq!(theme.category, "user-defined");
        assert!(theme.paths.contains("src/billing"));
        assert!(theme.linked_themes.contains("auth"));

        execute(parse(&["delete", "billing", "--path", &root_arg])).unwrap();
        assert!(!store.theme_exists("billing"));
    }

    #[test]
    fn test_context_for_missing_theme_fails() {
        let temp_dir = TempDir::new().unwrap();
        let root_arg = temp_dir.path().to_string_lossy().to_string();

        let err = execute(parse(&["context", "ghost", "--path", &root_arg])).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
