use std::path::PathBuf;
use std::sync::Arc;

use clap::ArgMatches;
use helmwatch_config::HelmwatchConfig;
use helmwatch_core::{LifecycleEvent, Monitor, StatsView, Visibility, run_lifecycle};
use helmwatch_paths::HelmwatchPaths;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::helpers;
use crate::color;
use crate::terminal::{TerminalNotifier, TerminalRenderer, format_stats};

/// A line typed while `watch` is running.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchInput {
    Toggle,
    TestNotification,
    ChatId(String),
    Hide,
    Show,
    Status,
    Quit,
    Help,
    Unknown(String),
}

impl WatchInput {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        Some(match command {
            "t" | "toggle" => WatchInput::Toggle,
            "n" | "notify" => WatchInput::TestNotification,
            "c" | "chat" => WatchInput::ChatId(rest.to_string()),
            "h" | "hide" => WatchInput::Hide,
            "s" | "show" => WatchInput::Show,
            "p" | "status" => WatchInput::Status,
            "q" | "quit" => WatchInput::Quit,
            "?" | "help" => WatchInput::Help,
            _ => WatchInput::Unknown(line.to_string()),
        })
    }
}

const HELP: &str = "t toggle detection | n test notification | c <ID> set chat id | h hide | s show | p status | q quit";

pub(crate) fn handle_watch_command(
    matches: &ArgMatches,
    config: &HelmwatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let save_frame = match matches.get_one::<String>("save-frame") {
        Some(path) => Some(frame_destination(path)?),
        None => None,
    };
    info!(
        event = "cli.watch_started",
        server = config.server.base_url(),
        save_frame = ?save_frame,
    );

    let runtime = helpers::runtime()?;
    runtime.block_on(run_watch(config, save_frame))?;

    info!(event = "cli.watch_completed");
    Ok(())
}

/// Resolve the `--save-frame` target and make sure its directory exists.
fn frame_destination(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = if path.is_empty() {
        HelmwatchPaths::resolve()?.latest_frame()
    } else {
        PathBuf::from(path)
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).inspect_err(|e| {
            eprintln!("Could not create '{}': {}", parent.display(), e);
        })?;
    }
    Ok(path)
}

async fn run_watch(
    config: &HelmwatchConfig,
    save_frame: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let renderer = Arc::new(TerminalRenderer::new(save_frame));
    let monitor = helpers::monitor(config, renderer, Arc::new(TerminalNotifier))?;

    let (events_tx, events_rx) = mpsc::channel(16);
    forward_signals(events_tx.clone())?;

    println!(
        "Watching {} {}",
        color::bold(config.server.base_url()),
        color::muted("(type ? for commands)")
    );
    monitor.start();

    tokio::select! {
        _ = run_lifecycle(&monitor, events_rx) => {}
        _ = read_commands(&monitor, events_tx) => {}
    }
    Ok(())
}

/// Handle typed commands. Never completes: once stdin closes, polling simply
/// continues until a signal ends it.
async fn read_commands(monitor: &Monitor, events: mpsc::Sender<LifecycleEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!(event = "cli.watch.stdin_closed");
                break;
            }
            Err(e) => {
                warn!(event = "cli.watch.stdin_failed", error = %e);
                break;
            }
        };
        let Some(input) = WatchInput::parse(&line) else {
            continue;
        };
        debug!(event = "cli.watch.input_received", input = ?input);

        let lifecycle = match input {
            WatchInput::Toggle => {
                monitor.toggle_detection().await;
                None
            }
            WatchInput::TestNotification => {
                monitor.test_notification().await;
                None
            }
            WatchInput::ChatId(chat_id) => {
                monitor.update_chat_id(&chat_id).await;
                None
            }
            WatchInput::Hide => Some(LifecycleEvent::Visibility(Visibility::Hidden)),
            WatchInput::Show => Some(LifecycleEvent::Visibility(Visibility::Visible)),
            WatchInput::Quit => Some(LifecycleEvent::Unload),
            WatchInput::Status => {
                print_watch_status(monitor);
                None
            }
            WatchInput::Help => {
                println!("{}", color::muted(HELP));
                None
            }
            WatchInput::Unknown(line) => {
                println!("Unknown command '{}'. {}", line, color::muted(HELP));
                None
            }
        };

        if let Some(event) = lifecycle
            && events.send(event).await.is_err()
        {
            break;
        }
    }
    std::future::pending::<()>().await;
}

fn print_watch_status(monitor: &Monitor) {
    let status = monitor.status();
    println!(
        "{} {} | {} | every {}ms | {}",
        color::muted("status"),
        status.connection,
        status.detection,
        status.config.frame_interval_ms,
        if status.running { "running" } else { "paused" },
    );
    if let Some(stats) = status.stats.as_ref() {
        println!("{}", format_stats(&StatsView::from(stats)));
    }
}

#[cfg(unix)]
fn forward_signals(events: mpsc::Sender<LifecycleEvent>) -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hide = signal(SignalKind::user_defined1())?;
    let mut show = signal(SignalKind::user_defined2())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = hide.recv() => LifecycleEvent::Visibility(Visibility::Hidden),
                _ = show.recv() => LifecycleEvent::Visibility(Visibility::Visible),
                _ = terminate.recv() => LifecycleEvent::Unload,
                _ = interrupt.recv() => LifecycleEvent::Unload,
            };
            info!(event = "cli.watch.signal_received", lifecycle = ?event);
            if events.send(event).await.is_err() {
                break;
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn forward_signals(events: mpsc::Sender<LifecycleEvent>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = events.send(LifecycleEvent::Unload).await;
        }
    });
    Ok(())
}
