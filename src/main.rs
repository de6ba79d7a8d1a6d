//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `egress_gate` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! Exit codes: 0 when the environment is safe, 2 when it is rejected, 1 on a
//! configuration error.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio_util::sync::CancellationToken;

use egress_gate::app::{print_gate_statistics, watch};
use egress_gate::initialization::init_logger_with;
use egress_gate::{GateSettings, GateStats, Opt, TrustGate, Verdict};

const EXIT_REJECTED: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let mut settings = GateSettings::from_env();
    if opt.disable {
        settings.enabled = false;
    }
    if let Some(secs) = opt.interval_seconds.filter(|s| *s > 0) {
        settings.check_interval = Duration::from_secs(secs);
    }

    let stats = Arc::new(GateStats::new());
    let gate = match TrustGate::from_settings(&settings) {
        Ok(gate) => gate.with_stats(Arc::clone(&stats)),
        Err(e) => {
            eprintln!("egress_gate error: invalid policy: {}", e);
            process::exit(1);
        }
    };

    if opt.watch {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping");
            }
            on_interrupt.cancel();
        });

        let json = opt.json;
        watch(&gate, settings.check_interval, cancel, |verdict| {
            report(verdict, json)
        })
        .await;
        print_gate_statistics(&stats);
        return Ok(());
    }

    let verdict = gate.evaluate().await;
    report(&verdict, opt.json);
    if !verdict.safe {
        process::exit(EXIT_REJECTED);
    }
    Ok(())
}

fn report(verdict: &Verdict, json: bool) {
    if json {
        match serde_json::to_string(verdict) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("egress_gate error: failed to encode verdict: {}", e),
        }
    } else if verdict.safe {
        println!("✅ {}", verdict.reason);
    } else {
        println!("⚠️ {}", verdict.reason);
    }
}
