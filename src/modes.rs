use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rayon::ThreadPoolBuilder;

use crate::args::Args;
use crate::fs::LocalFs;
use crate::logging::{LogTarget, init_logging};
use crate::navigator::Navigator;
use crate::report::print_listing;
use crate::settings::{AppSettings, load_settings, save_settings, settings_file_path};
use crate::tui::{App, draw_app};

/// Longest list mode waits for a single subdirectory before giving up.
const LIST_RESULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Runs the CLI application by selecting the appropriate mode.
///
/// ```rust,no_run
/// use purge::modes;
///
/// if let Err(err) = modes::run() {
///     eprintln!("{err}");
/// }
/// ```
pub fn run() -> Result<()> {
    let args = Args::parse();
    let settings = args.apply_to(load_settings());

    init_logging(&LogTarget::resolve(settings.log_file.as_deref(), !args.list))?;

    if args.save_settings {
        save_settings(&settings).context("failed to save settings")?;
        tracing::info!("saved settings to {}", settings_file_path().display());
    }

    let threads = worker_threads(&settings);
    if let Err(err) = ThreadPoolBuilder::new().num_threads(threads).build_global() {
        tracing::debug!("worker pool already configured: {err}");
    }

    let mut navigator =
        Navigator::new(Arc::new(LocalFs)).with_sort_policy(settings.sort_policy());
    let target = std::fs::canonicalize(&args.target)
        .with_context(|| format!("failed to resolve {}", args.target.display()))?;
    navigator
        .set_working_directory(&target)
        .with_context(|| format!("failed to open {}", target.display()))?;

    if args.list {
        run_list_mode(navigator)
    } else {
        run_tui_mode(App::new(navigator, settings.confirm_delete))
    }
}

/// Explicit count, or three quarters of the CPUs and at least one.
fn worker_threads(settings: &AppSettings) -> usize {
    if settings.worker_threads > 0 {
        settings.worker_threads
    } else {
        std::cmp::max(1, (num_cpus::get() * 3) / 4)
    }
}

/// Waits for every subdirectory size, then prints the table.
fn run_list_mode(mut navigator: Navigator) -> Result<()> {
    let started = Instant::now();
    while navigator.pending_count() > 0 {
        let deadline = Instant::now() + LIST_RESULT_TIMEOUT;
        while !navigator.wait_for_result(Duration::from_millis(250)) {
            if Instant::now() >= deadline {
                bail!(
                    "gave up waiting for {} directory sizes",
                    navigator.pending_count()
                );
            }
        }
    }
    tracing::info!(
        "sized {} in {:.1?}",
        navigator.current_path().display(),
        started.elapsed()
    );

    print_listing(navigator.current_path(), navigator.entries())
        .context("failed to write listing")
}

/// Launches the interactive TUI run-loop.
fn run_tui_mode(mut app: App) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
    terminal.clear().context("failed to clear terminal")?;

    let result = (|| -> Result<()> {
        // sizes arriving while no key is pressed show up within one tick
        let tick_rate = Duration::from_millis(200);

        loop {
            app.poll_results();

            terminal
                .draw(|frame| draw_app(frame, &mut app))
                .context("failed to draw frame")?;

            if event::poll(tick_rate).context("failed to poll for events")?
                && let Event::Key(key) = event::read().context("failed to read event")?
            {
                app.handle_key(key);
            }

            if app.should_quit() {
                break;
            }
        }
        Ok(())
    })();

    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    result
}
