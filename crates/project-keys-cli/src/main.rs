//! project-keys - headless host for project-specific keymaps.
//!
//! Treats a project file on disk as the only open window, so the keymap can
//! be generated or removed outside the editor.
//!
//! Usage:
//!   project-keys sync ~/code/MyApp.sublime-project
//!   project-keys clean ~/code/MyApp.sublime-project
//!   project-keys query ~/code/MyApp.sublime-project --operand MyApp.sublime-project
//!   project-keys --platform OSX paths ~/code/MyApp.sublime-project

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

use project_keys_core::{project_identifier, KeymapConfig, Platform};
use project_keys_plugin::{
    ContextOperator, EditorHost, HostAdapter, ProjectKeys, ProjectLifecycle, WindowId,
};

/// Window id of the single project this host exposes.
const WINDOW: WindowId = 0;

/// Generate project-specific Sublime Text keymaps.
#[derive(Parser, Debug)]
#[command(name = "project-keys")]
#[command(about = "Generate project-specific Sublime Text keymaps")]
struct Args {
    /// Keymap root directory (defaults to the editor's package directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Platform to generate for: OSX, Windows or Linux
    #[arg(long, global = true)]
    platform: Option<Platform>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write (or remove) the keymap for a project file
    Sync { project: PathBuf },

    /// Remove the keymap for a project file
    Clean { project: PathBuf },

    /// Evaluate a `project` context entry against a project file
    Query {
        project: PathBuf,

        /// Project identifier to compare against
        #[arg(long)]
        operand: String,

        #[arg(long, default_value = "equal")]
        operator: ContextOperator,
    },

    /// Print the resolved keymap locations
    Paths { project: Option<PathBuf> },
}

/// One project file, read once at startup.
struct FileHost {
    path: PathBuf,
    data: Value,
}

impl FileHost {
    fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {:?}", path))?;
        let data = serde_json::from_str(&text)
            .with_context(|| format!("Project file {:?} is not valid JSON", path))?;
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }
}

impl EditorHost for FileHost {
    fn windows(&self) -> Vec<WindowId> {
        vec![WINDOW]
    }

    fn project_file_name(&self, window: WindowId) -> Option<PathBuf> {
        (window == WINDOW).then(|| self.path.clone())
    }

    fn project_data(&self, window: WindowId) -> Option<Value> {
        (window == WINDOW).then(|| self.data.clone())
    }

    fn status_message(&self, message: &str) {
        eprintln!("{}", message);
    }
}

fn load_config(args: &Args) -> Result<KeymapConfig> {
    let mut config = KeymapConfig::load().context("Failed to load configuration")?;
    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if let Some(platform) = args.platform {
        config.platform = platform;
    }
    tracing::debug!(root = ?config.root, platform = %config.platform, "Resolved config");
    Ok(config)
}

fn adapter(config: &KeymapConfig, project: &Path) -> Result<HostAdapter<FileHost>> {
    let host = FileHost::open(project)?;
    let adapter = HostAdapter::new(host, ProjectKeys::new(config));
    adapter.keys().reconciler().paths().ensure_root()?;
    Ok(adapter)
}

/// Execute a command, returning the text to print.
fn run(args: &Args, config: &KeymapConfig) -> Result<String> {
    match &args.command {
        Command::Sync { project } => {
            let outcome = adapter(config, project)?.on_project_load(WINDOW)?;
            Ok(format!("{:?}", outcome))
        }
        Command::Clean { project } => {
            let outcome = adapter(config, project)?.on_project_close(WINDOW)?;
            Ok(format!("{:?}", outcome))
        }
        Command::Query {
            project,
            operand,
            operator,
        } => {
            let answer = adapter(config, project)?.on_query_context(
                WINDOW,
                "project",
                *operator,
                &Value::String(operand.clone()),
            );
            Ok(match answer {
                Some(true) => "true".to_string(),
                Some(false) => "false".to_string(),
                None => "none".to_string(),
            })
        }
        Command::Paths { project } => {
            let paths = config.paths();
            let mut lines = vec![format!("root: {}", paths.root().display())];
            if let Some(identifier) = project.as_deref().and_then(project_identifier) {
                lines.push(format!(
                    "directory: {}",
                    paths.directory(Some(&identifier)).display()
                ));
                lines.push(format!("file: {}", paths.file_path(&identifier).display()));
            }
            Ok(lines.join("\n"))
        }
    }
}

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = load_config(&args).and_then(|config| run(&args, &config));
    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup(data: Value) -> (tempfile::TempDir, PathBuf, KeymapConfig) {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("MyApp.sublime-project");
        std::fs::write(&project, data.to_string()).unwrap();
        let config = KeymapConfig::new(temp.path().join("keymaps"), Platform::Linux);
        (temp, project, config)
    }

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("project-keys").chain(argv.iter().copied()))
    }

    #[test]
    fn test_sync_and_clean() {
        let (_temp, project, config) =
            setup(json!({"keys": [{"keys": ["ctrl+k"], "command": "run_task"}]}));
        let project_arg = project.to_str().unwrap();
        let keymap = config.paths().file_path("MyApp.sublime-project");

        run(&parse(&["sync", project_arg]), &config).unwrap();
        assert!(keymap.is_file());

        run(&parse(&["clean", project_arg]), &config).unwrap();
        assert!(!keymap.exists());
    }

    #[test]
    fn test_query() {
        let (_temp, project, config) = setup(json!({}));
        let project_arg = project.to_str().unwrap();

        let out = run(
            &parse(&["query", project_arg, "--operand", "MyApp.sublime-project"]),
            &config,
        )
        .unwrap();
        assert_eq!(out, "true");

        let out = run(
            &parse(&[
                "query",
                project_arg,
                "--operator",
                "not_equal",
                "--operand",
                "Other.sublime-project",
            ]),
            &config,
        )
        .unwrap();
        assert_eq!(out, "true");

        let out = run(
            &parse(&[
                "query",
                project_arg,
                "--operand",
                "MyApp.sublime-project",
                "--operator",
                "regex_match",
            ]),
            &config,
        )
        .unwrap();
        assert_eq!(out, "none");
    }

    #[test]
    fn test_invalid_project_file() {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("Broken.sublime-project");
        std::fs::write(&project, "{ not json").unwrap();
        let config = KeymapConfig::new(temp.path().join("keymaps"), Platform::Linux);

        let err = run(&parse(&["sync", project.to_str().unwrap()]), &config).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_query_requires_operand_flag() {
        let positional = Args::try_parse_from([
            "project-keys",
            "query",
            "/x/App.sublime-project",
            "App.sublime-project",
        ]);
        assert!(positional.is_err());

        let args = parse(&["query", "/x/App.sublime-project", "--operand", "App.sublime-project"]);
        assert!(matches!(
            args.command,
            Command::Query { ref operand, operator: ContextOperator::Equal, .. }
                if operand == "App.sublime-project"
        ));
    }

    #[test]
    fn test_global_flags() {
        let args = parse(&["--platform", "OSX", "paths", "--root", "/k"]);
        assert_eq!(args.platform, Some(Platform::Osx));
        assert_eq!(args.root, Some(PathBuf::from("/k")));
    }

    #[test]
    fn test_paths() {
        let config = KeymapConfig::new("/k", Platform::Windows);
        let out = run(&parse(&["paths", "/x/App.sublime-project"]), &config).unwrap();
        assert!(out.contains("root: /k"));
        assert!(out.contains("Default (Windows).sublime-keymap"));
    }
}
