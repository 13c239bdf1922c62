//! blog-reader: an infinitely scrolling blog reader for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  FetchMsg  ┌──────────┐  draw()  ┌──────────┐
//! │ fetch.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (tasks)  │  (channel) │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘          └──────────┘
//!      ▲                    ▲      │
//!      │ Effect             │      │ handle_key_event()
//!      └────────────────────┼──────┘
//!                      ┌──────────┐
//!                      │ input.rs │
//!                      └──────────┘
//! ```
//!
//! * **`feed/`**: the `ArticleSource` trait, the HTTP source and the
//!   incremental `FeedLoader`.
//! * **`routes`**: listing/detail routes and the detail page cache.
//! * **`scroll`**: the scroll-proximity check that triggers paging.
//! * **`fetch`**: runs network requests on tokio tasks.
//! * **`app`**: owns all application state.
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations.
//! * **`config`** / **`cli`**: settings file and flags.
//! * **`main`**: wires everything together: load settings, pre-fetch,
//!   set up the terminal, and run the event loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use blog_reader::app::{articles, App};
use blog_reader::cli::Cli;
use blog_reader::config::{Config, LogConfig};
use blog_reader::feed::{ArticleSource, FeedLoader, HttpSource};
use blog_reader::fetch::Fetcher;
use blog_reader::routes::{self, DetailCache, Route, SeedRefresh};
use blog_reader::{input, ui};

// ---------------------------------------------------------------------------
// Terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Send `tracing` output to the configured file; stdout belongs to the UI.
fn init_logging(log: &LogConfig) -> Result<()> {
    let log_file = std::fs::File::create(&log.file)
        .with_context(|| format!("Failed to create log file: {}", log.file))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // -- settings ------------------------------------------------------------
    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config)?;
    cli.apply(&mut config);
    init_logging(&config.log)?;
    tracing::info!(base_url = %config.api.base_url, page_size = config.feed.page_size, "starting");

    let source: Arc<dyn ArticleSource> = Arc::new(
        HttpSource::new(&config.api.base_url, "api").context("Failed to build HTTP client")?,
    );

    // -- startup fetches -----------------------------------------------------
    // The first page seeds the listing while detail pages are pre-built.  A
    // failed seed leaves the listing empty: the scroll trigger takes over
    // from page 2 and the first page is retried on the short schedule.
    let mut feed = FeedLoader::new(Arc::clone(&source), config.feed.page_size);
    let mut details = DetailCache::new(config.routes.revalidate_secs);
    let seed = routes::warm_up(
        Arc::clone(&source),
        feed.page_size(),
        config.routes.prebuild_limit,
        &mut details,
        Utc::now(),
    )
    .await;
    let retry_seed = seed.is_empty();
    feed.initialize(seed);

    let mut seed_refresh =
        SeedRefresh::new(config.routes.revalidate_secs, config.routes.seed_retry_secs);
    seed_refresh.schedule(retry_seed, Utc::now());

    let (fetcher, mut rx) = Fetcher::new(source);
    let mut app = App::new(feed, details, config.feed.trigger_distance);
    app.seed_refresh = seed_refresh;
    app.status = format!(
        "{} ready, {} pre-built",
        articles(app.feed.state().items().len()),
        app.details.prebuilt_count()
    );
    if let Route::Article(id) = cli.open {
        app.open(id);
    }

    // -- terminal setup (Drop restores on exit or panic) -----------------------
    install_panic_hook();
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply finished fetches.
    //   2. Render the UI.
    //   3. Poll for keyboard input (up to tick_rate).
    //   4. Start the fetches the input or a due refresh asked for.
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process fetch results
        while let Ok(msg) = rx.try_recv() {
            app.apply(msg);
        }

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if tokio::task::block_in_place(|| event::poll(tick_rate))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        // 4. Dispatch network work
        app.tick(Utc::now());
        for effect in app.take_effects() {
            fetcher.dispatch(effect);
        }

        if app.quit {
            break;
        }
    }

    tracing::info!("shutting down");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
