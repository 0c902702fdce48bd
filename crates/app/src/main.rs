use std::fmt;
use std::path::{Path, PathBuf};

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bee_core::catalog::Catalog;
use services::enrichment::{
    DictionaryConfig, DirectorySource, MerriamWebsterClient, download_audio, fetch_missing,
};
use services::{AppServices, Clock};
use storage::StorageBackend;

mod config;
mod response;
mod routes;

use config::{Config, normalize_sqlite_url};
use routes::AppState;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidHost { raw: String },
    InvalidPort { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidHost { raw } => write!(f, "invalid --host value: {raw}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- serve    [options]");
    eprintln!("  cargo run -p app -- populate [options]");
    eprintln!("  cargo run -p app -- fetch    [options] [--audio]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     SQLite URL (default: sqlite://spelling_bee.db)");
    eprintln!("  --memory              Keep everything in memory");
    eprintln!("  --host <ip>           Bind address (default: 127.0.0.1)");
    eprintln!("  --port <port>         Bind port (default: 5001)");
    eprintln!("  --catalog <path>      Catalog JSON (default: bundled word lists)");
    eprintln!("  --data-dir <path>     Dictionary cache directory (default: mw_data)");
    eprintln!("  --audio-dir <path>    Audio directory (default: audio)");
    eprintln!("  --audio               fetch: also download pronunciation audio");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BEE_DB_URL, BEE_STORAGE, HOST, PORT, RUST_LOG, BEE_CATALOG, BEE_DATA_DIR,");
    eprintln!("  BEE_AUDIO_DIR, BEE_LEARNERS, MW_API_KEY_ELEMENTARY, MW_API_KEY_SCHOOL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Populate,
    Fetch,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "populate" => Some(Self::Populate),
            "fetch" => Some(Self::Fetch),
            _ => None,
        }
    }
}

struct Args {
    config: Config,
    with_audio: bool,
}

impl Args {
    fn parse(
        mut config: Config,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut with_audio = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    config.storage = StorageBackend::Sqlite {
                        url: normalize_sqlite_url(value),
                    };
                }
                "--memory" => config.storage = StorageBackend::Memory,
                "--host" => {
                    let value = require_value(args, "--host")?;
                    config.host = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidHost { raw: value.clone() })?;
                }
                "--port" => {
                    let value = require_value(args, "--port")?;
                    config.port = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
                }
                "--catalog" => {
                    config.catalog = Some(PathBuf::from(require_value(args, "--catalog")?));
                }
                "--data-dir" => {
                    config.data_dir = PathBuf::from(require_value(args, "--data-dir")?);
                }
                "--audio-dir" => {
                    config.audio_dir = PathBuf::from(require_value(args, "--audio-dir")?);
                }
                "--audio" => with_audio = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { config, with_audio })
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Catalog::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(Catalog::bundled()?),
    }
}

async fn open_services(config: &Config) -> Result<AppServices, Box<dyn std::error::Error>> {
    if let StorageBackend::Sqlite { url } = &config.storage {
        prepare_sqlite_file(url)?;
    }
    Ok(AppServices::open(&config.storage, Clock::system()).await?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means serve.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Serve,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Serve,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let Args { config, with_audio } =
        Args::parse(Config::from_env()?, &mut argv.into_iter()).map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let catalog = load_catalog(config.catalog.as_deref())?;
    let cache = DirectorySource::new(&config.data_dir);

    match cmd {
        Command::Serve => {
            let services = open_services(&config).await?;
            let report = services
                .bootstrap(&catalog, &cache, &config.learners)
                .await?;
            info!(inserted = report.inserted, skipped = report.skipped, "catalog ready");

            let app = routes::router(AppState { services }).layer(TraceLayer::new_for_http());

            let addr = config.bind_addr();
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "spelling bee listening");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            info!("server stopped");
            Ok(())
        }
        Command::Populate => {
            let services = open_services(&config).await?;
            let report = services
                .bootstrap(&catalog, &cache, &config.learners)
                .await?;
            if report.skipped {
                info!("word store already populated; nothing to do");
            }
            Ok(())
        }
        Command::Fetch => {
            let Some(dictionary) = DictionaryConfig::from_env() else {
                eprintln!("fetch: set MW_API_KEY_ELEMENTARY and/or MW_API_KEY_SCHOOL");
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "no dictionary API key configured",
                )
                .into());
            };
            let client = MerriamWebsterClient::new(dictionary)?;
            fetch_missing(&catalog, &cache, &client).await?;
            if with_audio {
                download_audio(&catalog, &cache, &config.audio_dir).await?;
            }

            let services = open_services(&config).await?;
            services.bootstrap(&catalog, &cache, &config.learners).await?;
            services.refresh_enrichment(&catalog, &cache).await?;
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url.starts_with("sqlite::memory:") || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
