//! t6inject - syntax-check and compile T6 script projects with gsc-tool

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use t6inject_config::ToolchainOptions;
use t6inject_core::{passing_files, Platform, SyntaxCheckResult};
use t6inject_project::Project;
use t6inject_toolchain::Toolchain;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "t6inject")]
#[command(about = "Syntax-check and compile T6 script projects with gsc-tool")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    toolchain: ToolchainArgs,

    /// Log debug output (including every gsc-tool invocation)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ToolchainArgs {
    /// Options file (key = value) describing the gsc-tool installation
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory containing gsc-tool.exe
    #[arg(long, value_name = "DIR", global = true)]
    tool_dir: Option<PathBuf>,

    /// Explicit gsc-tool executable
    #[arg(long, value_name = "FILE", global = true)]
    tool_path: Option<PathBuf>,

    /// Target platform: pc, ps3 or xb2
    #[arg(long, value_name = "SYSTEM", global = true)]
    system: Option<Platform>,

    /// Only stderr lines starting with this marker count as errors
    #[arg(long, value_name = "MARKER", global = true)]
    marker: Option<String>,

    /// Kill gsc-tool runs that take longer than this
    #[arg(long, value_name = "SECS", global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List project scripts and report whether main.gsc exists
    List {
        /// Project root
        project: PathBuf,
    },
    /// Syntax-check every script in a project
    Check {
        /// Project root
        project: PathBuf,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check, then compile the project into a single script
    Build {
        /// Project root
        project: PathBuf,

        /// Where to write the compiled script
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Drop scripts with syntax errors (and allow a missing main.gsc)
        #[arg(long)]
        allow_errors: bool,
    },
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Clean,
    SyntaxErrors,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(Status::Clean) => ExitCode::SUCCESS,
        Ok(Status::SyntaxErrors) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Status> {
    match cli.command {
        Command::List { project } => {
            let project = Project::discover(&project)?;
            for file in &project.files {
                println!("{}", file.display());
            }
            info!(
                "{} scripts, main.gsc {}",
                project.files.len(),
                if project.has_entry { "found" } else { "missing" }
            );
            Ok(Status::Clean)
        }
        Command::Check { project, json } => {
            let toolchain = load_toolchain(&cli.toolchain)?;
            let project = discover_non_empty(&project)?;

            let results = toolchain.check_syntax(&project.files).await?;
            print_results(&results, json)?;

            if results.iter().any(|r| r.has_error) {
                Ok(Status::SyntaxErrors)
            } else {
                Ok(Status::Clean)
            }
        }
        Command::Build {
            project,
            output,
            allow_errors,
        } => {
            let toolchain = load_toolchain(&cli.toolchain)?;
            let project = discover_non_empty(&project)?;

            if !project.has_entry {
                if allow_errors {
                    warn!("{} has no main.gsc", project.root.display());
                } else {
                    bail!("{} has no main.gsc", project.root.display());
                }
            }

            let results = toolchain.check_syntax(&project.files).await?;
            let failed: Vec<&SyntaxCheckResult> = results.iter().filter(|r| r.has_error).collect();
            for result in &failed {
                warn!(
                    "Skipping {}: {}",
                    result.path.display(),
                    result.message.as_deref().unwrap_or("syntax error")
                );
            }
            if !failed.is_empty() && !allow_errors {
                bail!("{} scripts have syntax errors", failed.len());
            }

            let survivors = passing_files(&results);
            if survivors.is_empty() {
                bail!("no scripts left to compile");
            }

            let compiled = toolchain.compile(&survivors).await?;
            std::fs::write(&output, &compiled)
                .with_context(|| format!("writing {}", output.display()))?;

            info!(
                "Wrote {} ({} bytes from {} scripts)",
                output.display(),
                compiled.len(),
                survivors.len()
            );
            Ok(Status::Clean)
        }
    }
}

/// Options file first, command-line flags on top
fn load_toolchain(args: &ToolchainArgs) -> anyhow::Result<Toolchain> {
    let mut options = match &args.config {
        Some(path) => ToolchainOptions::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ToolchainOptions::default(),
    };

    if let Some(dir) = &args.tool_dir {
        options.tool_dir = Some(dir.clone());
    }
    if let Some(path) = &args.tool_path {
        options.tool_path = Some(path.clone());
    }
    if let Some(system) = args.system {
        options.platform = system;
    }
    if let Some(marker) = &args.marker {
        options.marker = Some(marker.clone());
    }
    if let Some(secs) = args.timeout_secs {
        options.timeout_secs = (secs > 0).then_some(secs);
    }

    options.display();

    let config = options
        .into_config()
        .context("gsc-tool installation is not usable")?;
    Ok(Toolchain::new(config))
}

fn discover_non_empty(root: &Path) -> anyhow::Result<Project> {
    let project = Project::discover(root)?;
    if project.files.is_empty() {
        bail!("no .gsc scripts found under {}", root.display());
    }
    Ok(project)
}

fn print_results(results: &[SyntaxCheckResult], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    for result in results {
        match &result.message {
            Some(message) => println!("FAIL {}: {}", result.path.display(), message),
            None => println!("ok   {}", result.path.display()),
        }
    }
    Ok(())
}
