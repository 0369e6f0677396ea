use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use statuswatch::config::Overrides;
use statuswatch::notify::{Notification, REFRESH_FAILED};
use statuswatch::{
    aggregate, app::export_view, events, ui, App, NotificationQueue, Notifier, RefreshScheduler,
    Settings,
};

#[derive(Parser, Debug)]
#[command(name = "statuswatch")]
#[command(about = "Terminal status page for monitored services")]
struct Args {
    /// Base URL of the status API (e.g. https://status.example.com)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Read the component tree from a JSON file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Aggregate once, write the view to this JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write logs to this file (the TUI discards them otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.export.is_some())?;

    let overrides = Overrides {
        url: args.url,
        file: args.file,
        refresh_interval_secs: args.refresh,
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;

    let rt = Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return export_to_file(&rt, &settings, &export_path);
    }

    run_tui(&rt, &settings)
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
fn init_tracing(log_file: Option<&Path>, export: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Anything written to the terminal would corrupt the TUI
    let writer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None if export => BoxMakeWriter::new(io::stderr),
        None => BoxMakeWriter::new(io::sink),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(())
}

/// Fetch once, aggregate and write the view as JSON.
fn export_to_file(rt: &Runtime, settings: &Settings, export_path: &Path) -> Result<()> {
    let source = settings.build_source()?;
    let components = rt
        .block_on(source.fetch_status())
        .with_context(|| format!("Failed to fetch from {}", source.description()))?;
    let view = aggregate(&components)?;

    export_view(&view, export_path)?;
    println!("Exported status view to: {}", export_path.display());
    Ok(())
}

/// Run the TUI against the configured source.
fn run_tui(rt: &Runtime, settings: &Settings) -> Result<()> {
    let source = settings.build_source()?;
    let queue = NotificationQueue::default();
    let scheduler = RefreshScheduler::builder(source)
        .interval(settings.refresh_interval())
        .notifier(Arc::new(queue.clone()))
        .build();

    {
        let _guard = rt.enter();
        scheduler.start()?;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(
        scheduler.subscribe(),
        scheduler.source_description(),
        queue.clone(),
    );

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, rt, &scheduler, &queue);

    scheduler.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rt: &Runtime,
    scheduler: &RefreshScheduler,
    queue: &NotificationQueue,
) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        if app.take_refresh_request() {
            let scheduler = scheduler.clone();
            let queue = queue.clone();
            rt.spawn(async move {
                match scheduler.refresh().await {
                    Ok(_) => info!("Manual refresh complete"),
                    Err(e) => {
                        warn!("Manual refresh failed: {}", e);
                        queue.notify(Notification::error(REFRESH_FAILED));
                    }
                }
            });
        }

        app.poll_updates();
    }

    Ok(())
}
