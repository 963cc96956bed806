use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::error::{HarnessError, Result};
use crate::logging::{self, LogFormat};
use crate::scenario::{Report, Scenario, replay};

#[derive(Debug, Parser)]
#[command(
    name = "ftui-sortable-harness",
    about = "Replay drag-and-drop scenarios against nested sortable lists",
    version
)]
pub struct Cli {
    /// Log format written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSON scenario file and print the report.
    Run(RunArgs),

    /// Replay the built-in nested-lists story.
    Story(OutputArgs),

    /// Print the built-in story as a scenario file.
    #[command(name = "dump-story")]
    DumpStory(OutputArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    pub scenario: PathBuf,

    /// Override the drag distance threshold in cells.
    #[arg(long)]
    pub distance: Option<u16>,

    /// Disable multi-select.
    #[arg(long)]
    pub single_select: bool,

    /// Reject drops into a collection other than the origin.
    #[arg(long)]
    pub no_cross_collection: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl RunArgs {
    fn apply(&self, scenario: &mut Scenario) {
        let mut config = scenario.config;
        if let Some(distance) = self.distance {
            config = config.with_distance_threshold(distance);
        }
        if self.single_select {
            config = config.with_multiple(false);
        }
        if self.no_cross_collection {
            config = config.with_cross_collection_drag(false);
        }
        scenario.config = config;
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => {
            let mut scenario = Scenario::load(&args.scenario)?;
            args.apply(&mut scenario);
            info!(path = %args.scenario.display(), steps = scenario.steps.len(), "running scenario");
            let report = replay(&scenario)?;
            emit(&report, &args.output)
        }
        Commands::Story(output) => {
            let report = replay(&Scenario::story())?;
            emit(&report, &output)
        }
        Commands::DumpStory(output) => emit(&Scenario::story(), &output),
    }
}

fn emit<T: serde::Serialize>(value: &T, output: &OutputArgs) -> Result<()> {
    let text = if output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match &output.output {
        Some(path) => write_file(path, &text),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if path.is_dir() {
        return Err(HarnessError::invalid(format!(
            "output path is a directory: {}",
            path.display()
        )));
    }
    fs::write(path, text)?;
    Ok(())
}

/// Parse a written report back, used by tests and downstream tooling.
pub fn read_report(path: &Path) -> Result<Report> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
