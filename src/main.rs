use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use fuelbol::{
    config::FuelbolConfig,
    errors::{ConfigError, FuelbolError},
    feed::{FeedClient, FeedSource},
    init_logging,
    pipeline::classify_snapshot,
    sink::{ConsoleSink, EventLog},
    MarkerBoard, RefreshService,
};

#[derive(Parser)]
#[command(name = "fuelbol", version, about = "Fuel station levels, colored by how much is left")]
struct Cli {
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feed once and print every station marker
    Fetch {
        /// Print a GeoJSON FeatureCollection instead of one line per marker
        #[arg(long)]
        json: bool,
    },
    /// Fetch the feed once and print the detail view of one station
    Detail {
        /// Station id or name
        station: String,
    },
    /// Keep the markers up to date until Ctrl-C
    Watch {
        /// Minutes between refreshes, overrides the config file
        #[arg(long)]
        interval_minutes: Option<u64>,

        /// Do not align refreshes to wall-clock multiples of the interval
        #[arg(long)]
        no_align: bool,
    },
}

/// Logs a failed command. User errors also get a plain message on stderr and exit code 2.
fn report<E: FuelbolError>(event: &str, e: E) -> E {
    error!(
        event = event,
        error = %e,
        error_code = e.error_code(),
        user_error = e.is_user_error()
    );

    if e.is_user_error() {
        eprintln!("fuelbol: {}", e);
        std::process::exit(2);
    }
    e
}

async fn load_board(client: &FeedClient) -> Result<MarkerBoard, Box<dyn std::error::Error>> {
    let snapshot = client
        .fetch_snapshot()
        .await
        .map_err(|e| report("cli.fetch_failed", e))?;

    let mut board = MarkerBoard::new();
    board.apply(classify_snapshot(&snapshot), &mut EventLog::new());
    Ok(board)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let client = FeedClient::new();

    match cli.command {
        Commands::Fetch { json } => {
            let board = load_board(&client).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board.feature_collection())?);
            } else {
                let mut sink = ConsoleSink::default();
                let markers: Vec<_> = board.markers().cloned().collect();
                MarkerBoard::new().apply(markers, &mut sink);
            }
        }
        Commands::Detail { station } => {
            let board = load_board(&client).await?;
            match board.find(&station) {
                Some(marker) => println!("{}", marker.detail_view()),
                None => return Err(format!("No station matches '{}'", station).into()),
            }
        }
        Commands::Watch {
            interval_minutes,
            no_align,
        } => {
            let mut config = FuelbolConfig::load_hierarchy()
                .map_err(|e| report("cli.config_load_failed", e))?;
            if interval_minutes.is_some() {
                config.poll.interval_minutes = interval_minutes;
            }
            if no_align {
                config.poll.align_to_wall_clock = Some(false);
            }
            let schedule = config
                .schedule()
                .map_err(|e: ConfigError| report("cli.config_invalid", e))?;

            let service = RefreshService::spawn(
                schedule,
                Arc::new(client) as Arc<dyn FeedSource>,
                ConsoleSink::default(),
            );

            tokio::signal::ctrl_c().await?;
            info!(event = "cli.interrupted");

            if tokio::time::timeout(Duration::from_secs(5), service.shutdown())
                .await
                .is_err()
            {
                error!(event = "cli.shutdown_timed_out");
            }
        }
    }

    Ok(())
}
