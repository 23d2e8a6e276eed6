use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use ratatui::DefaultTerminal;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod inputter;
mod message;
mod model;
mod ui;

use controller::Controller;
use model::{Model, Status};
use rosterview::datasets::Dataset;
use rosterview::domain::{TVConfig, TVError, ViewConfig};
use rosterview::loader;
use rosterview::store::SchoolStore;
use ui::TableUI;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DatasetArg {
    Students,
    Teachers,
    Fees,
}

impl From<DatasetArg> for Dataset {
    fn from(d: DatasetArg) -> Self {
        match d {
            DatasetArg::Students => Dataset::Students,
            DatasetArg::Teachers => Dataset::Teachers,
            DatasetArg::Fees => Dataset::Fees,
        }
    }
}

/// Browse school records, or any CSV, Parquet or Arrow file, in a searchable,
/// filterable, sortable and paginated table.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Data file to open instead of the demo school (~ and $VARS are expanded)
    path: Option<String>,

    /// Dataset of the demo school to start with
    #[arg(short, long, value_enum)]
    dataset: Option<DatasetArg>,

    /// Demo account to log in with
    #[arg(short, long, default_value = "admin@school.test")]
    user: String,

    #[arg(short, long, default_value = "admin123")]
    password: String,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    #[arg(long, default_value_t = 30)]
    max_column_width: usize,

    #[arg(long, default_value = "rv.log")]
    log_file: String,

    /// Used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> TVConfig {
        TVConfig {
            event_poll_time: self.poll_ms,
            max_column_width: self.max_column_width,
            view: ViewConfig::default().page_size(self.page_size),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_tracing(&args.log_file, &args.log_level) {
        eprintln!("Error: could not open log file {}: {e}", args.log_file);
        return ExitCode::FAILURE;
    }
    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing(log_file: &str, log_level: &str) -> Result<(), TVError> {
    let file = File::create(expand_path(log_file)?)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn expand_path(path: &str) -> Result<PathBuf, TVError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| TVError::LoadingFailed(e.to_string()))
}

fn run(args: Args) -> Result<(), TVError> {
    info!("Starting rv!");
    let cfg = args.config();

    let model = match &args.path {
        Some(path) => {
            let table = loader::load_file(expand_path(path)?)?;
            Model::from_table(&cfg, table)?
        }
        None => {
            let store = SchoolStore::seeded();
            let session = store.authenticate(&args.user, &args.password)?;
            Model::from_store(&cfg, store, session, args.dataset.map(Dataset::from))?
        }
    };

    let mut terminal = ratatui::init();
    let result = event_loop(&cfg, model, &mut terminal);
    ratatui::restore();
    result
}

fn event_loop(cfg: &TVConfig, mut model: Model, terminal: &mut DefaultTerminal) -> Result<(), TVError> {
    let mut ui = TableUI::new(cfg);
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Bye!");
    Ok(())
}
