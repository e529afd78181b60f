//! WinNew - Browse and download official Windows installation images
//!
//! Command line front end: each subcommand drives a [`Session`] the way
//! the dropdowns of a browsing UI would and prints the resulting view.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};

use winnew::api::ApiClient;
use winnew::commands::{get_system_locale, prefers_localized_labels};
use winnew::config;
use winnew::filters::{Architecture, FilterAction};
use winnew::notify::Notice;
use winnew::projector::{SearchFilter, SearchScope};
use winnew::render;
use winnew::session::Session;
use winnew::settings::{SettingsStore, ThemeMode};
use winnew::utils::get_cache_dir;
use winnew::verify;
use winnew::{log_debug, log_error, log_info, log_warn, logging};
use winnew::{ApiError, SettingsError, VerifyError};

const MODULE: &str = "main";

#[derive(Debug, Parser)]
#[command(name = "winnew", version, about, long_about = None, propagate_version = true)]
struct Cli {
    /// Backend host (overrides WINNEW_API_HOST and the settings file)
    #[arg(long, global = true)]
    api_host: Option<String>,

    /// Enable debug logging for this run
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Newest consumer image of Windows 11 and Windows 10
    Latest,
    /// Available systems, and versions of one system
    Options {
        #[arg(long)]
        system: Option<String>,
    },
    /// Editions and languages offered for a system version
    Editions {
        #[arg(long)]
        system: String,
        #[arg(long)]
        version: String,
        #[arg(long, default_value_t = Architecture::All)]
        arch: Architecture,
    },
    /// Files matching a full selection
    #[command(alias = "ls")]
    Files(FilesArgs),
    /// Open a download link in the browser
    Open { url: String },
    /// Copy a download link to the clipboard
    Copy { url: String },
    /// Check a downloaded image against its SHA-256
    Verify {
        file: PathBuf,
        #[arg(long)]
        sha256: String,
    },
    /// Show or change the theme mode
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// Show or change developer mode (debug logging)
    #[command(name = "dev-mode")]
    DevMode {
        #[arg(value_parser = ["on", "off"])]
        state: Option<String>,
    },
}

#[derive(Debug, clap::Args)]
struct FilesArgs {
    #[arg(long)]
    system: String,
    #[arg(long)]
    version: String,
    #[arg(long)]
    language: String,
    #[arg(long, default_value = "")]
    edition: String,
    #[arg(long, default_value_t = Architecture::All)]
    arch: Architecture,
    /// Free-text search within the results
    #[arg(long, short)]
    search: Option<String>,
    #[arg(long, default_value_t = SearchScope::All)]
    scope: SearchScope,
}

#[derive(Debug, Subcommand)]
enum ThemeAction {
    Get,
    Set { mode: ThemeMode },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("{0}")]
    Failed(String),
}

fn open_settings() -> SettingsStore {
    match SettingsStore::open_default() {
        Ok(store) => store,
        Err(e) => {
            log_warn!(MODULE, "{}. Keeping settings in the cache directory.", e);
            SettingsStore::open(get_cache_dir(config::app::NAME).join(config::app::SETTINGS_FILE))
        }
    }
}

fn attach_log_file() {
    let path = get_cache_dir(config::app::NAME).join(config::app::LOG_FILE);
    match logging::attach_file(&path) {
        Ok(()) => log_debug!(MODULE, "Logging to {}", path.display()),
        Err(e) => log_warn!(MODULE, "Failed to open log file {}: {}", path.display(), e),
    }
}

fn print_notices(rx: &mut broadcast::Receiver<Notice>) {
    loop {
        match rx.try_recv() {
            Ok(notice) => eprintln!("{}", render::render_notice(&notice)),
            Err(TryRecvError::Lagged(skipped)) => {
                log_warn!(MODULE, "{} notices dropped", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

async fn run(cli: Cli, settings: &SettingsStore) -> Result<ExitCode, CliError> {
    match cli.command {
        Command::Theme { action } => return run_theme(settings, action),
        Command::DevMode { state } => return run_dev_mode(settings, state.as_deref()),
        Command::Verify { file, sha256 } => return run_verify(file, &sha256).await,
        _ => {}
    }

    let host = config::urls::resolve_api_host(
        cli.api_host.as_deref(),
        settings.get().api_host.as_deref(),
    );
    let client = ApiClient::new(host)?;
    log_info!(MODULE, "API host: {}", client.host());

    let localized = prefers_localized_labels(&get_system_locale());
    let session = Session::new(Arc::new(client), localized);
    let mut notices = session.subscribe_notices();

    let result = run_session(&session, cli.command).await;
    session.shutdown();
    print_notices(&mut notices);
    result
}

async fn run_session(session: &Session<ApiClient>, command: Command) -> Result<ExitCode, CliError> {
    match command {
        Command::Latest => {
            session.start().await;
            if let Some(error) = session.snapshot().error {
                return Err(CliError::Failed(error));
            }
            let records = session.latest_records();
            println!("{}", render::render_guarded(|| render::render_records(&records)));
        }
        Command::Options { system } => {
            load_version_options(session).await?;
            if let Some(system) = system {
                warn_if_not_offered(session.selector_view().allows_system(&system), "System", &system);
                session.set_system_code(system).await;
            }
            let view = session.selector_view();
            println!(
                "{}",
                render::render_guarded(|| render::render_selector(&view, session.localized()))
            );
        }
        Command::Editions {
            system,
            version,
            arch,
        } => {
            select_version(session, system, version, arch).await?;
            let view = session.selector_view();
            println!(
                "{}",
                render::render_guarded(|| render::render_selector(&view, session.localized()))
            );
        }
        Command::Files(args) => {
            select_version(session, args.system, args.version, args.arch).await?;

            let view = session.selector_view();
            warn_if_not_offered(view.allows_language(&args.language), "Language", &args.language);
            if !args.edition.is_empty() {
                warn_if_not_offered(view.allows_edition(&args.edition), "Edition", &args.edition);
            }

            session
                .apply([
                    FilterAction::SetLanguage(args.language),
                    FilterAction::SetEdition(args.edition),
                ])
                .await;

            if let Some(error) = session.snapshot().error {
                return Err(CliError::Failed(error));
            }

            let search = SearchFilter::new(args.search.unwrap_or_default(), args.scope);
            let results = session.display_records(&search);
            println!(
                "{}",
                render::render_guarded(|| render::render_search_results(&results))
            );
        }
        Command::Open { url } => {
            if !session.handle_download(&url) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Copy { url } => {
            if !session.handle_copy(&url) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Theme { .. } | Command::DevMode { .. } | Command::Verify { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}

async fn load_version_options(session: &Session<ApiClient>) -> Result<(), CliError> {
    match session.dispatcher().load_version_options().await {
        Some(_) => Ok(()),
        None => Err(CliError::Failed(
            "Failed to load system and version options".to_string(),
        )),
    }
}

/// Select system, version and architecture, which loads the edition and
/// language catalog
async fn select_version(
    session: &Session<ApiClient>,
    system: String,
    version: String,
    arch: Architecture,
) -> Result<(), CliError> {
    load_version_options(session).await?;

    warn_if_not_offered(session.selector_view().allows_system(&system), "System", &system);
    session
        .apply([
            FilterAction::SetArchitecture(arch),
            FilterAction::SetSystemCode(system),
        ])
        .await;
    warn_if_not_offered(session.selector_view().allows_version(&version), "Version", &version);
    session.set_version(version).await;
    Ok(())
}

fn warn_if_not_offered(allowed: bool, what: &str, value: &str) {
    if !allowed {
        log_warn!(MODULE, "{} '{}' is not offered by the backend", what, value);
    }
}

fn run_theme(settings: &SettingsStore, action: Option<ThemeAction>) -> Result<ExitCode, CliError> {
    match action.unwrap_or(ThemeAction::Get) {
        ThemeAction::Get => println!("{}", settings.get().theme_mode),
        ThemeAction::Set { mode } => {
            settings.set_theme_mode(mode)?;
            println!("{}", mode);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_dev_mode(settings: &SettingsStore, state: Option<&str>) -> Result<ExitCode, CliError> {
    if let Some(state) = state {
        let enabled = state == "on";
        settings.set_developer_mode(enabled)?;
        logging::set_log_level(enabled);
    }
    println!("{}", if settings.get().developer_mode { "on" } else { "off" });
    Ok(ExitCode::SUCCESS)
}

async fn run_verify(file: PathBuf, sha256: &str) -> Result<ExitCode, CliError> {
    let cancel = Arc::new(AtomicBool::new(false));
    let watcher = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::SeqCst);
            }
        })
    };

    let outcome = verify::verify_sha256_cancellable(&file, sha256, cancel).await;
    watcher.abort();
    let outcome = outcome?;

    if outcome.is_match() {
        println!("OK  {}  {}", outcome.actual, outcome.path.display());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("MISMATCH  {}", outcome.path.display());
        println!("  expected {}", outcome.expected);
        println!("  actual   {}", outcome.actual);
        Ok(ExitCode::FAILURE)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging system
    logging::init();
    let cli = Cli::parse();

    let settings = open_settings();
    if cli.verbose || settings.get().developer_mode {
        logging::set_log_level(true);
    }
    attach_log_file();

    log_debug!(MODULE, "=== WinNew {} ===", env!("CARGO_PKG_VERSION"));
    log_debug!(
        MODULE,
        "OS: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    log_debug!(MODULE, "Settings: {}", settings.path().display());

    match run(cli, &settings).await {
        Ok(code) => code,
        Err(e) => {
            log_error!(MODULE, "{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
