use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keypace::{
    app::{App, KeyOutcome},
    app_dirs::AppDirs,
    config::{is_valid_duration, ConfigStore, FileConfigStore, DURATION_CHOICES},
    engine::MetricsEngine,
    history::{export_csv, HistoryStore, SqliteHistory},
    logging::init_logging,
    passage::{BuiltinPassages, FixedPassage, PassageProvider},
    runtime::{AppEvent, Runner, TerminalEvents, POLL_INTERVAL},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{info, warn};

/// timed typing test with per-second speed tracking and history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test: type the passage until the clock runs out, then see your speed, accuracy and consistency, with a local history of every finished test."
)]
pub struct Cli {
    /// test length in seconds (15, 30, 60, 120, 300 or 600); remembered for next time
    #[clap(short = 's', long)]
    secs: Option<u32>,

    /// custom passage to type instead of the built-in texts
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// open on the history screen
    #[clap(long)]
    reports: bool,

    /// write the result history as CSV to this path and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();

    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = init_logging(&path, &config.log_level) {
            eprintln!("logging disabled: {err}");
        }
    }

    if let Some(path) = cli.export.as_ref() {
        let history = SqliteHistory::open_default()?;
        export_csv(&history.history()?, File::create(path)?)?;
        info!(path = %path.display(), "exported history");
        return Ok(());
    }

    if let Some(secs) = cli.secs {
        if !is_valid_duration(secs) {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::InvalidValue,
                format!("--secs must be one of {DURATION_CHOICES:?}"),
            )
            .exit();
        }
        if secs != config.duration_secs {
            config.duration_secs = secs;
            if let Err(err) = config_store.save(&config) {
                warn!(%err, "could not save config");
            }
        }
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let history: Option<Box<dyn HistoryStore>> = match SqliteHistory::open_default() {
        Ok(db) => Some(Box::new(db)),
        Err(err) => {
            warn!(%err, "history disabled");
            None
        }
    };

    let provider: Box<dyn PassageProvider> = match cli.prompt.clone() {
        Some(prompt) => Box::new(FixedPassage(prompt)),
        None => Box::new(BuiltinPassages::new()),
    };

    let mut app = App::new(MetricsEngine::new(), config.duration_secs, provider, history);
    if cli.reports {
        app.open_reports();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(TerminalEvents::new(), POLL_INTERVAL);

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let redraw = match runner.step() {
            AppEvent::Poll => app.on_poll(),
            AppEvent::Resize => true,
            AppEvent::Key(key) => {
                // Close any second that already ended so the key is credited
                // to the right window.
                let was_running = app.has_started();
                app.on_poll();
                let just_finished = was_running && !app.has_started();

                if !just_finished && app.handle_key(key) == KeyOutcome::Quit {
                    break;
                }
                true
            }
        };

        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}
