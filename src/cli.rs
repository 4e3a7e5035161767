use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use methodinsight::config::Config;
use methodinsight::core::{MethodRef, ProjectIndex, ReportEngine};

#[derive(Parser)]
#[command(name = "methodinsight")]
#[command(about = "Sequence diagrams and matching tests for a single Java method")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the sequence report for one method
    Report {
        /// Entry method, e.g. `com.example.Service#handle` or `com.example.Service.handle(Request)`
        method: String,

        /// Production source root (repeatable, replaces the configured ones)
        #[arg(short, long = "source-root")]
        source_root: Vec<PathBuf>,

        /// Test source root (repeatable, replaces the configured ones)
        #[arg(long)]
        test_root: Vec<PathBuf>,

        /// Output directory (defaults to the configured one, then the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Deepest call level whose body is still scanned
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print the Markdown report instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report {
                method,
                source_root,
                test_root,
                output,
                max_depth,
                stdout,
            } => {
                let mut config = Config::load_or_default(self.config.as_deref())
                    .context("Failed to load configuration")?;
                if !source_root.is_empty() {
                    config.project.source_dirs = source_root;
                }
                if !test_root.is_empty() {
                    config.project.test_dirs = test_root;
                }
                if let Some(depth) = max_depth {
                    config.analysis.max_depth = depth;
                }
                report(config, &method, output, stdout)
            }
            Commands::Init { path, force } => init(path, force),
        }
    }
}

fn report(config: Config, method: &str, output: Option<PathBuf>, stdout: bool) -> Result<()> {
    let entry: MethodRef = method.parse()?;
    let index = ProjectIndex::load(Path::new("."), &config.project)
        .context("Failed to index the project")?;

    let engine = ReportEngine::new(config);
    let report = engine.generate(&index, &entry)?;

    if stdout {
        print!("{}", report.markdown);
        return Ok(());
    }

    let out_dir = output
        .or_else(|| engine.config().output.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let written = report
        .write_to(&out_dir, &engine.config().output)
        .with_context(|| format!("Failed to write report to {}", out_dir.display()))?;
    for path in written {
        info!("✅ Wrote {}", path.display());
        println!("{}", path.display());
    }
    Ok(())
}

fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));
    info!("Initializing MethodInsight in: {}", target_dir.display());

    let config_path = target_dir.join(Config::CANDIDATES[1]);
    if config_path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", config_path.display());
    }

    std::fs::create_dir_all(&target_dir)?;
    Config::default().save(&config_path)?;
    info!("✅ Created {}", config_path.display());
    Ok(())
}
