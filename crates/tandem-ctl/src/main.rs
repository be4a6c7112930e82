//! tandem-ctl — command-line interface for the Tandem daemon.

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 9300;

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusResponse {
    registered:  usize,
    queued:      usize,
    paired:      usize,
    uptime_secs: u64,
}

#[derive(Deserialize)]
struct ReportsResponse {
    count:   usize,
    reports: Vec<ReportRecord>,
}

#[derive(Deserialize)]
struct ReportRecord {
    reporter:  String,
    reported:  Option<String>,
    payload:   serde_json::Value,
    timestamp: u64,
}

// ── HTTP helpers ──────────────────────────────────────────────────────────────

fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{}/api", port)
}

async fn get_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T> {
    reqwest::get(url)
    .await
    .with_context(|| format!("failed to connect to tandemd at {} — is it running?", url))?
    .json::<T>()
    .await
    .context("failed to parse response")
}

// ── Subcommand handlers ───────────────────────────────────────────────────────

async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Tandem Daemon Status");
    println!("═══════════════════════════════════════");
    println!("  Registered users : {}", resp.registered);
    println!("  Waiting in queue : {}", resp.queued);
    println!("  In a session     : {}", resp.paired);
    println!("  Uptime           : {}s", resp.uptime_secs);

    Ok(())
}

async fn cmd_reports(port: u16) -> Result<()> {
    let resp: ReportsResponse = get_json(&format!("{}/reports", base_url(port))).await?;

    if resp.reports.is_empty() {
        println!("No reports stored.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Stored Reports ({})", resp.count);
    println!("═══════════════════════════════════════");

    for r in &resp.reports {
        println!("  ┌─ {}", &r.reporter[..16.min(r.reporter.len())]);
        match &r.reported {
            Some(reported) => println!("  │  reported : {}", &reported[..16.min(reported.len())]),
            None           => println!("  │  reported : (not paired)"),
        }
        println!("  │  payload  : {}", r.payload);
        println!("  └─ at       : {}", r.timestamp);
    }

    Ok(())
}

fn print_usage() {
    println!("Usage: tandem-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status    Show registered/queued/paired counts and uptime");
    println!("  reports   List stored user reports");
    println!();
    println!("Options:");
    println!("  --port <port>   Daemon API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args.get(i)
            .context("--port requires a value")?
            .parse()
            .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | []                => cmd_status(port).await,
        ["reports"]                    => cmd_reports(port).await,
        ["help"] | ["--help"] | ["-h"] => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
