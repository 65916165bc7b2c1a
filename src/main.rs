//! keyaxis: analog keyboard to virtual joystick axes
//!
//! Config tooling, a frame-script simulator and, with the `wooting` and
//! `uinput` features, a live run loop.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use keyaxis::config::AxisTable;
use keyaxis::host::{HostInfo, HostLog, HostLogLevel, RecordingRegistrar, GAME_ID_EUT2};
use keyaxis::plugin::{InitParams, Plugin, INPUT_API_VERSION};
use keyaxis::simulate::{parse_script, run_script};
use keyaxis::MemoryDevice;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(AxisTable::default_path);

    match cli.command {
        Commands::CheckConfig => check_config(&config_path),
        Commands::InitConfig { force } => init_config(&config_path, force),
        Commands::Simulate { script, host_log } => simulate(config_path, &script, host_log),
        #[cfg(all(feature = "wooting", feature = "uinput", target_os = "linux"))]
        Commands::Run { rate } => run(config_path, rate),
    }
}

fn check_config(path: &Path) -> Result<()> {
    println!("Config: {}", path.display());
    let table = match AxisTable::load(path) {
        Ok(table) => table,
        Err(e) => {
            println!("  {} (defaults would be used)", e);
            AxisTable::with_defaults()
        }
    };

    for (index, axis) in table.iter().enumerate() {
        println!("  axis{}  {}", index + 1, axis);
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    AxisTable::with_defaults()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default axis table to {}", path.display());
    Ok(())
}

fn simulate(config_path: PathBuf, script: &Path, host_log: bool) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let frames = parse_script(&text)?;

    let log: Option<Arc<dyn HostLog>> = if host_log {
        Some(Arc::new(|level: HostLogLevel, line: &str| {
            println!("<{}> {}", level, line);
        }))
    } else {
        None
    };

    let mut registrar = RecordingRegistrar::new();
    let params = InitParams {
        host: HostInfo::new(GAME_ID_EUT2, keyaxis::host::IMPLEMENTED_GAME_VERSION),
        log,
        config_path,
        registrar: &mut registrar,
    };
    let mut plugin = Plugin::init(INPUT_API_VERSION, params, MemoryDevice::new())?;

    let reports = run_script(&mut plugin, &frames);
    let table = plugin.axis_device().table().clone();
    plugin.shutdown();

    for (n, report) in reports.iter().enumerate() {
        if report.events.is_empty() {
            println!("frame {} (line {}): no change", n + 1, report.line);
            continue;
        }
        for event in &report.events {
            let name = table
                .get(event.input_index)
                .map(|axis| axis.display_name.as_str())
                .unwrap_or("?");
            println!(
                "frame {} (line {}): axis{} ({}) = {:.3}",
                n + 1,
                report.line,
                event.input_index + 1,
                name,
                event.value
            );
        }
    }
    info!("Simulated {} frames", reports.len());
    Ok(())
}

#[cfg(all(feature = "wooting", feature = "uinput", target_os = "linux"))]
fn run(config_path: PathBuf, rate: u32) -> Result<()> {
    use keyaxis::host::IMPLEMENTED_GAME_VERSION;
    use keyaxis::uinput::UinputHost;
    use keyaxis_device::WootingDevice;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tracing::error;

    if rate == 0 {
        bail!("--rate must be at least 1");
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let mut host = UinputHost::new();
    let params = InitParams {
        host: HostInfo::new(GAME_ID_EUT2, IMPLEMENTED_GAME_VERSION),
        log: None,
        config_path,
        registrar: &mut host,
    };
    let mut plugin = Plugin::init(INPUT_API_VERSION, params, WootingDevice::new())?;

    if let Some(path) = host.device_path() {
        info!("Device path: {}", path.display());
    }
    info!("Running at {} Hz, Ctrl+C to stop", rate);

    let frame = Duration::from_secs(1) / rate;
    while running.load(Ordering::SeqCst) {
        let events = plugin.poll_frame();
        if let Err(e) = host.apply(&events) {
            error!("{}", e);
            break;
        }
        std::thread::sleep(frame);
    }

    info!("Stopping");
    plugin.shutdown();
    Ok(())
}
