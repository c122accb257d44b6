use anyhow::Context;
use bridge::server::StationBridge;
use bridge::state::{read_state, sweep_config, write_state, SharedState, StationState};
use clap::Parser;
use dispatch::config::StationConfig;
use generator::sweep::SweepGenerator;
use log::info;
use sondecore::geo::{compute_look_angle, GeodeticPoint};
use sondecore::tasks::{FrequencyPicker, TaskListReconciler};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod bridge;
mod dispatch;
mod generator;

#[derive(Parser)]
#[command(author, version, about = "Radiosonde station emulator for the dashboard")]
struct Args {
    /// Load a station config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 2)]
    sdrs: usize,
    /// Enable web control with this password
    #[arg(long)]
    password: Option<String>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Print the reconciled task panel and one scan summary, then exit
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Serve the station API until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn sweep_timestamp() -> String {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", elapsed.as_secs(), elapsed.subsec_millis())
}

fn print_offline_report(state: &SharedState) -> anyhow::Result<()> {
    let body = serde_json::to_string(&read_state(state).table.task_list())
        .context("serializing task list")?;
    let mut reconciler = TaskListReconciler::default();
    let reconciled = reconciler
        .ingest(&body)
        .context("reconciling emulated task list")?;
    let mut picker = FrequencyPicker::new();
    picker.rebuild(&reconciled.snapshot);

    println!("Task panel ({} tasks):", reconciled.view.lines().len());
    for line in reconciled.view.lines() {
        println!("  {} {}", line.glyph, line.label);
    }
    let options: Vec<String> = picker.options().iter().map(|o| o.label.clone()).collect();
    println!("Stop-decoder options: {}", options.join(", "));

    let guard = read_state(state);
    println!(
        "Scan {}: {} bins, noise floor {:.2} dB, peaks {:?}",
        guard.scan.timestamp,
        guard.scan.freq.len(),
        guard.scan.threshold,
        guard.scan.peak_freq
    );

    // A target 0.1° north of the station at 10 km, as a sanity check of the
    // configured position.
    let observer = guard.settings.observer();
    let probe = GeodeticPoint::new(
        observer.latitude + 0.1,
        observer.longitude,
        observer.altitude + 10_000.0,
    );
    let look = compute_look_angle(observer, probe);
    println!(
        "Sample look angle: elevation {:.1}°, azimuth {:.1}° ({}), range {:.0} m",
        look.elevation, look.azimuth, look.bearing, look.range
    );
    Ok(())
}

async fn run_station(
    bridge: StationBridge,
    state: SharedState,
    mut generator: SweepGenerator,
    address: SocketAddr,
    scan_interval: Duration,
) -> anyhow::Result<()> {
    let housekeeping_state = state.clone();
    tokio::spawn(async move {
        let mut housekeeping = tokio::time::interval(Duration::from_secs(2));
        let mut scan = tokio::time::interval(scan_interval);
        loop {
            tokio::select! {
                _ = housekeeping.tick() => {
                    write_state(&housekeeping_state).table.housekeeping();
                }
                _ = scan.tick() => {
                    let refreshed = write_state(&housekeeping_state)
                        .refresh_scan(&mut generator, sweep_timestamp());
                    if refreshed {
                        info!("published new scan result");
                    }
                }
            }
        }
    });

    bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
    tokio::select! {
        _ = bridge.serve(address) => {}
        result = signal::ctrl_c() => {
            result.context("awaiting Ctrl+C to exit")?;
            bridge.publish_status("shutting down");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.config {
        StationConfig::load(path)?
    } else {
        StationConfig::from_args(args.sdrs, args.password, args.seed)
    };
    config.validate()?;

    let state = StationState::new(&config).shared();
    let mut generator = SweepGenerator::new(sweep_config(&config), config.seed);
    {
        let mut guard = write_state(&state);
        guard.table.housekeeping();
        guard.refresh_scan(&mut generator, sweep_timestamp());
    }

    if args.offline {
        print_offline_report(&state)?;
    }

    if args.serve {
        let address = SocketAddr::from(([127, 0, 0, 1], config.port));
        let bridge = StationBridge::new(state.clone());
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the station API")?;
        runtime.block_on(run_station(
            bridge,
            state,
            generator,
            address,
            Duration::from_secs(config.scan_interval_secs.max(1)),
        ))?;
    }

    Ok(())
}
