//! Host a phase scheduler in the terminal.
//!
//! Commands arrive one per line on stdin; every state change is printed to
//! stdout and phase-start notifications go to the log on stderr.

use clap::Args;
use pomodorotec_core::{
    spawn_notifier, Command, Config, PhaseScheduler, SchedulerSnapshot, TracingNotifier,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::logging;

#[derive(Args)]
pub struct RunArgs {
    /// Start a focus session immediately
    #[arg(long)]
    autostart: bool,
    /// Print snapshots and events as JSON lines
    #[arg(long)]
    json: bool,
}

enum Flow {
    Continue,
    Quit,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    logging::init(&config.logging.filter);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(args, config));
    // A pending stdin read would otherwise hold shutdown open.
    runtime.shutdown_background();
    result
}

async fn session(args: RunArgs, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = PhaseScheduler::new()?;
    let notifier = spawn_notifier(
        &scheduler,
        TracingNotifier::new(config.notifications.enabled),
    );
    let mut state = scheduler.watch();

    if args.autostart || config.scheduler.auto_start {
        scheduler.start_focus();
    }
    let initial = state.borrow_and_update().clone();
    print_snapshot(&initial, args.json)?;
    info!("commands: start, pause, resume, toggle, skip, reset, status, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state.borrow_and_update().clone();
                print_snapshot(&snapshot, args.json)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Flow::Quit = handle_line(&scheduler, &line, args.json)? {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    scheduler.shutdown();
    notifier.abort();
    Ok(())
}

fn handle_line(
    scheduler: &PhaseScheduler,
    line: &str,
    json: bool,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let word = line.trim();
    match word.to_ascii_lowercase().as_str() {
        "" => {}
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        "status" => print_snapshot(&scheduler.snapshot(), json)?,
        _ => match word.parse::<Command>() {
            Ok(command) => {
                let event = scheduler.dispatch(command);
                if let (true, Some(event)) = (json, event) {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
            Err(e) => warn!("{e}"),
        },
    }
    Ok(Flow::Continue)
}

fn print_snapshot(snapshot: &SchedulerSnapshot, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }
    let status = if snapshot.running { "running" } else { "paused" };
    let hint = if snapshot.skip_visible { "  [skip]" } else { "" };
    println!(
        "[{}] {} ({status}){hint}",
        snapshot.phase, snapshot.remaining_text
    );
    Ok(())
}
