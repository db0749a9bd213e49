use anyhow::Context;
use clap::{Parser, Subcommand};
use outreach_roadmap::cli;
use outreach_roadmap::config::{
    RoadmapConfig, DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_PROJECTION_VOLUME,
};
use outreach_roadmap::types::Channel;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roadmap")]
#[command(about = "Outreach funnel planner: KPI gaps, projections, action plans and Excel reports")]
#[command(long_about = "Outreach Roadmap - plan outbound sales from revenue goal to daily outreach

CHANNELS:
  LIO  LinkedIn Outbound Plan     (requests must be accepted first)
  FIO  Facebook & IG DM Outreach  (direct messages)
  EO   Email Outreach             (cold email)

COMMANDS:
  show     - KPI gap analysis, goal progress, funnel and action plan
  project  - What an outreach volume yields at target rates
  plan     - Work back from the revenue goal to the outreach volume
  set      - Update one field, e.g. LIO.currentPerformance.dealsClosed
  select   - Make a channel the default
  export   - Styled Excel report with live formulas
  load     - Replace the stored snapshot with a YAML/JSON file
  dump     - Print or save the stored snapshot
  reset    - Restore the built-in defaults
  watch    - Re-render the dashboard whenever the snapshot changes

EXAMPLES:
  roadmap show --channel EO
  roadmap set programSettings.targetRevenueGoal 250000
  roadmap project --channel LIO --volume 1500
  roadmap export --output plan.xlsx")]
#[command(version)]
struct Cli {
    /// Directory holding the persisted snapshot
    #[arg(long, global = true, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show KPIs, goal progress, funnel conversion and the action plan
    Show {
        /// Channel code (LIO, FIO, EO); defaults to the selected channel
        #[arg(short, long)]
        channel: Option<Channel>,
    },

    /// Project funnel results for an outreach volume
    Project {
        #[arg(short, long)]
        channel: Option<Channel>,

        /// Requests, messages or emails to send
        #[arg(long, default_value_t = DEFAULT_PROJECTION_VOLUME)]
        volume: f64,
    },

    /// Backward plan from the revenue goal
    Plan {
        #[arg(short, long)]
        channel: Option<Channel>,
    },

    #[command(long_about = "Update one field of the stored snapshot.

PATHS:
  programSettings.offerName | offerPrice | targetRevenueGoal
  <LIO|FIO|EO>.currentPerformance.<field>
  <LIO|FIO|EO>.referenceTargets.<field>

Numeric values use their leading number; anything else becomes 0 and
negative numbers are clamped to 0.")]
    /// Update one field of the stored snapshot
    Set {
        /// Dotted field path
        path: String,

        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Make a channel the default for other commands
    Select {
        /// Channel code (LIO, FIO, EO)
        channel: Channel,
    },

    /// Export the styled Excel report
    Export {
        /// Output path (default: OutreachRoadmap_FullPlan_<date>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the stored snapshot with a YAML or JSON file
    Load {
        file: PathBuf,
    },

    /// Print the stored snapshot as YAML, or write it to a file
    Dump {
        /// Output path; .yaml/.yml for YAML, anything else for JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore the built-in defaults
    Reset,

    /// Re-render the dashboard whenever the snapshot changes
    Watch {
        #[arg(short, long)]
        channel: Option<Channel>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = RoadmapConfig::new(cli.data_dir, cli.verbose);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Show { channel } => cli::show(&config, channel)?,
        Commands::Project { channel, volume } => cli::project(&config, channel, volume)?,
        Commands::Plan { channel } => cli::plan(&config, channel)?,
        Commands::Set { path, value } => cli::set(&config, &path, &value)
            .with_context(|| format!("Failed to set {}", path))?,
        Commands::Select { channel } => cli::select(&config, channel)?,
        Commands::Export { output } => cli::export(&config, output)
            .await
            .context("Excel export failed")?,
        Commands::Load { file } => cli::load(&config, file.clone())
            .with_context(|| format!("Failed to load {}", file.display()))?,
        Commands::Dump { output } => cli::dump(&config, output)?,
        Commands::Reset => cli::reset(&config)?,
        Commands::Watch { channel } => cli::watch(&config, channel)?,
    }

    Ok(())
}
