mod anki;
mod cluster;
mod config;
mod dialogue;
mod journal;
mod models;
mod planner;
mod predictor;
mod report;
mod stats;
mod storage;
mod timer;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::Config;
use dialogue::Dialogue;
use journal::Journal;
use models::{PlanInputs, SessionPlan, TimeOfDay};
use predictor::RidgeModel;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use storage::Storage;
use timer::BlockTimer;

#[derive(Parser)]
#[command(name = "studyflow")]
#[command(about = "Plan study sessions, time work/break blocks and analyze Anki statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PlanArgs {
    /// Total session duration (e.g. 90, 90m, 2h)
    #[arg(short, long)]
    duration: Option<String>,
    /// Time of day the session takes place
    #[arg(long, value_enum, default_value_t = TimeOfDay::Morning)]
    time_of_day: TimeOfDay,
    /// Expected concentration (1-10)
    #[arg(short, long, default_value_t = 7.0)]
    concentration: f64,
    /// Days since the last study session
    #[arg(long, default_value_t = 1)]
    days_since: u32,
    /// Rating of the previous session (1-10)
    #[arg(short, long, default_value_t = 7.0)]
    rating: f64,
    /// Path to the exported ridge model (JSON)
    #[arg(short, long)]
    model: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a work/break schedule
    Plan(PlanArgs),
    /// Generate a schedule and run the block timer
    Timer(PlanArgs),
    /// Analyze an exported Anki statistics PDF
    Analyze {
        /// Path to the PDF
        pdf: PathBuf,
    },
    /// Log study sessions and feedback, export them as CSV
    Journal {
        /// CSV file to export to
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

fn init_logging(base_dir: &Path, level: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(base_dir.join("studyflow.log"))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn generate_plan(args: &PlanArgs, config: &Config, base_dir: &Path) -> Result<SessionPlan> {
    let total_minutes = match &args.duration {
        Some(d) => utils::parse_minutes(d)?,
        None => config.default_duration_mins,
    };
    let inputs = PlanInputs::new(
        total_minutes,
        args.time_of_day,
        args.concentration,
        args.days_since,
        args.rating,
    )?;

    let model_path = args
        .model
        .clone()
        .unwrap_or_else(|| config.model_path(base_dir));
    let model = RidgeModel::load(&model_path)?;

    Ok(planner::build_plan(&inputs, &model))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base_dir = config::get_base_dir()?;
    let config = config::load_config(&base_dir)?;
    init_logging(&base_dir, &config.log_level)?;

    match cli.command {
        Commands::Plan(args) => {
            let plan = generate_plan(&args, &config, &base_dir)?;
            print!("{}", report::render_plan(&plan));
        }
        Commands::Timer(args) => {
            let plan = generate_plan(&args, &config, &base_dir)?;
            let mut timer = BlockTimer::new(plan);

            tui::run_tui(&mut timer, StdDuration::from_millis(config.refresh_millis))?;

            println!("\nSession ended.");
            print!("{}", report::render_plan(timer.plan()));
        }
        Commands::Analyze { pdf } => {
            let bytes =
                std::fs::read(&pdf).with_context(|| format!("Could not open {}", pdf.display()))?;
            let metrics = anki::extract_metrics_from_pdf(&bytes)
                .map_err(|e| anyhow::anyhow!("Failed to read the PDF: {}", e))?;
            let cluster = cluster::assign_cluster(&metrics.features());
            log::info!("Assigned cluster {:?}", cluster);
            print!("{}", report::render_analysis(&metrics, cluster));
        }
        Commands::Journal { export } => {
            let storage =
                Storage::from_path(export.unwrap_or_else(|| config.export_path(&base_dir)));
            let mut journal = Journal::new();

            let stdin = io::stdin();
            Dialogue::new(
                stdin.lock(),
                io::stdout(),
                &mut journal,
                &storage,
                chrono::Local::now,
            )
            .run()?;

            // Nothing survives the process, so hand the log over on the way out
            if !journal.entries().is_empty() {
                storage.export(&journal)?;
                println!(
                    "Saved {} sessions to {}",
                    journal.entries().len(),
                    storage.path().display()
                );
            }
            print!("{}", report::render_journal(&journal));
        }
    }

    Ok(())
}
