mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use anyhow::bail;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use laliga_api::client::FootballDataApi;
use laliga_api::fetch::{self, FetchConfig};
use laliga_api::loader::{LoaderConfig, SeasonLoader};
use laliga_api::storage::default_storage;
use log::{error, warn};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

enum Mode {
    Tui,
    Fetch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(mode) = handle_cli_args() else {
        return Ok(());
    };

    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    match mode {
        Mode::Fetch => run_fetch().await,
        Mode::Tui => run_tui().await,
    }
}

fn handle_cli_args() -> Option<Mode> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Some(Mode::Tui);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            None
        }
        "-V" | "--version" => {
            println!("ligatui {}", env!("CARGO_PKG_VERSION"));
            None
        }
        "--fetch" => Some(Mode::Fetch),
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "ligatui - LaLiga standings and fixtures in the terminal

Usage:
  ligatui              browse the published season data
  ligatui --fetch      refresh season files from football-data.org
  ligatui --help
  ligatui --version

Environment:
  LIGATUI_BASE_URL     Season data root, URL or directory (default public/)
  LIGATUI_SEASON       Season shown at startup, e.g. 2024-2025
  LIGATUI_LOG          Log level: error, warn, info, debug, trace
  FOOTBALL_DATA_TOKEN  API token used by --fetch
  FETCH_SEASONS        --fetch seasons: 2023,2024 or recent:N (default last 10)
  FORCE_REFRESH        --fetch refetches complete historical seasons when set
  LIGATUI_DATA_DIR     --fetch output directory (default public/data)"
}

/// One-shot refresh of the published season files.
async fn run_fetch() -> anyhow::Result<()> {
    init_fetch_logging();

    let now = chrono::Utc::now();
    let config = FetchConfig::from_env(now);
    if config.token.is_none() {
        warn!("FOOTBALL_DATA_TOKEN is not set; only the manifest will be rebuilt");
    }
    let api = FootballDataApi::new(config.token.clone());
    let report = fetch::run(&config, &api, now).await?;
    println!("{report}");

    let failures = report.failures();
    if failures > 0 {
        bail!("{failures} season(s) failed to refresh");
    }
    Ok(())
}

/// `--fetch` runs without a terminal UI, so log records go to stderr.
fn init_fetch_logging() {
    let level = AppSettings::load().log_level.unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .init();
}

async fn run_tui() -> anyhow::Result<()> {
    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let settings = AppSettings::load();
    let loader = SeasonLoader::new(
        LoaderConfig { base_url: settings.base_url.clone() },
        default_storage(),
    );
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(loader, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Trigger the first season load
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let label = app.lock().await.season_label().to_string();
            let _ = network_requests.send(NetworkRequest::LoadSeason { label }).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
        }
        NetworkResponse::SeasonLoaded { label, snapshot } => {
            let mut guard = app.lock().await;
            guard.on_season_loaded(&label, snapshot);
        }
        NetworkResponse::Error { label, message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_load_error(&label, message);
        }
    }
    true
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
