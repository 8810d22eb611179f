use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use aquawatch::data::duration::{format_duration, parse_duration};
use aquawatch::{App, HttpReadingSource, MemoryReadingSource, MonitorConfig, NoticeKind, ReadingSource};

#[derive(Parser, Debug)]
#[command(name = "aquawatch")]
#[command(about = "Water-flow monitor with debounced overflow alerting")]
struct Args {
    /// Reading backend endpoint (GET returns the reading list, POST appends)
    #[arg(
        short,
        long,
        default_value = "http://localhost:5000/api/water",
        conflicts_with = "memory"
    )]
    endpoint: String,

    /// Use an in-process reading store instead of an HTTP backend
    #[arg(long)]
    memory: bool,

    /// Poll interval in seconds (0 disables automatic polling)
    #[arg(short, long, default_value = "2")]
    refresh: u64,

    /// Flow-rate threshold above which sustained readings indicate overflow
    #[arg(short, long, default_value = "100")]
    threshold: f64,

    /// Debounce window a violation must persist before the alert fires (e.g. "5s", "500ms")
    #[arg(short, long, default_value = "5s")]
    window: String,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aquawatch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let window = parse_duration(&args.window)?;
    let config = MonitorConfig {
        threshold: args.threshold,
        window,
    };

    let source: Box<dyn ReadingSource> = if args.memory {
        Box::new(MemoryReadingSource::new())
    } else {
        Box::new(HttpReadingSource::new(&args.endpoint))
    };

    let mut app = App::new(source, config);
    println!(
        "aquawatch | source: {} (threshold {}, window {})",
        app.source_description(),
        args.threshold,
        format_duration(window)
    );
    println!("commands: fetch | submit <flow> <qty> | clear | quit");

    app.fetch_latest().await;
    report(&mut app);

    run_loop(&mut app, args.refresh).await
}

/// Main loop: interactive commands, periodic polling, and redraw on
/// overflow state transitions.
async fn run_loop(app: &mut App, refresh_secs: u64) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = (refresh_secs > 0).then(|| {
        let period = Duration::from_secs(refresh_secs);
        tokio::time::interval_at(tokio::time::Instant::now() + period, period)
    });
    let mut overflow_rx = app.subscribe_overflow();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_command(app, line.trim()).await {
                            return Ok(());
                        }
                        report(app);
                    }
                    // stdin closed
                    None => return Ok(()),
                }
            }
            _ = next_tick(&mut ticker) => {
                app.fetch_latest().await;
                report(app);
            }
            _ = overflow_rx.changed() => {
                report(app);
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Dispatch one command line. Returns false when the user quits.
async fn handle_command(app: &mut App, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("fetch") => {
            app.fetch_latest().await;
        }
        Some("submit") => {
            let flow_rate = parts.next().unwrap_or("");
            let quantity = parts.next().unwrap_or("");
            app.submit(flow_rate, quantity).await;
        }
        Some("clear") => {
            app.clear();
        }
        Some("quit") | Some("exit") => return false,
        Some(other) => println!("unknown command: {other}"),
        None => {}
    }
    true
}

/// Render a plain-text snapshot of the app state plus any queued notices.
fn report(app: &mut App) {
    for notice in app.drain_notices() {
        match notice.kind {
            NoticeKind::Success => println!("ok: {}", notice.message),
            NoticeKind::Error => println!("!! {}", notice.message),
        }
    }

    if app.overflowing() {
        println!("*** WATER IS OVERFLOWING ***");
    }

    for reading in app.readings() {
        println!(
            "  {:>8.2} L/min  {:>8.2} L  {}",
            reading.flow_rate,
            reading.quantity,
            reading.timestamp.to_rfc3339()
        );
    }
}
