use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use refgraph::logging::{init_tracing, init_tracing_json};
use refgraph::report::{report_path, write_report};
use refgraph::{analyze_path, AnalysisConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "refgraph: transitive dependency report for an executable module",
    long_about = None
)]
struct Cli {
    /// Executable or shared library to analyze.
    target: PathBuf,

    /// Directory the report is written to (default: desktop, then home).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Extra directory searched for dependencies. May be repeated.
    #[arg(long = "search-path", value_name = "DIR")]
    search_paths: Vec<PathBuf>,

    /// Do not search the platform's standard library directories.
    #[arg(long)]
    no_system_paths: bool,

    /// JSON analysis configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,

    /// Write the report without indentation.
    #[arg(long)]
    compact: bool,
}

impl Cli {
    /// File configuration with command line overrides applied.
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        config.search.paths.extend(self.search_paths.iter().cloned());
        if self.no_system_paths {
            config.search.use_system_paths = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = Some(dir.clone());
        }
        if self.compact {
            config.output.pretty = false;
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let config = cli.analysis_config()?;

    println!("Analyzing {}...", cli.target.display());
    let report = analyze_path(&cli.target, &config)?;

    let out = report_path(&cli.target, &config.output);
    write_report(&report, &out, config.output.pretty)
        .with_context(|| format!("failed to write report {}", out.display()))?;
    Ok(out)
}

fn check_target(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    if !path.is_file() {
        bail!("not a file: {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.json_logs {
        init_tracing_json();
    } else {
        init_tracing();
    }

    if let Err(err) = check_target(&cli.target) {
        eprintln!("Error: {}", err);
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(out) => {
            println!("Analysis written to {}.", out.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Fatal: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
