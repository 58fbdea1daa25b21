//! Switchover simulator entry point: CLI wiring and drill/soak/TUI dispatch.

use std::process;

use lt_switchover_sim::cli::{self, CliOptions, DrillSource, Mode};
use lt_switchover_sim::config::DrillConfig;
use lt_switchover_sim::drill::{self, DrillError, DrillReport};
use lt_switchover_sim::io::export::{export_events_csv, export_timeline_csv};
use lt_switchover_sim::{logging, soak};

fn main() {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    // The TUI owns the terminal; log output would corrupt it.
    if opts.mode != Mode::Tui {
        logging::init();
    }

    match &opts.mode {
        Mode::Drill(source) => {
            let report = match run_drill(source) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("{e}");
                    process::exit(1);
                }
            };
            println!("{report}");
            if let Err(e) = write_exports(&opts, &report) {
                eprintln!("error: failed to write CSV: {e}");
                process::exit(1);
            }
            if opts.serve {
                serve(report, opts.port);
            }
        }
        Mode::Soak { ticks, seed } => {
            let report = soak::run(*ticks, *seed);
            println!("{report}");
            if !report.passed() {
                process::exit(1);
            }
        }
        Mode::Tui => run_tui(),
    }
}

fn run_drill(source: &DrillSource) -> Result<DrillReport, DrillError> {
    let cfg = match source {
        DrillSource::File(path) => DrillConfig::from_toml_file(path)?,
        DrillSource::Preset(name) => DrillConfig::from_preset(name)?,
    };
    drill::run(&cfg)
}

fn write_exports(opts: &CliOptions, report: &DrillReport) -> std::io::Result<()> {
    if let Some(path) = &opts.events_out {
        export_events_csv(&report.events, path)?;
        eprintln!("Event log written to {}", path.display());
    }
    if let Some(path) = &opts.timeline_out {
        export_timeline_csv(&report.timeline, path)?;
        eprintln!("Timeline written to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "api")]
fn serve(report: DrillReport, port: u16) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(lt_switchover_sim::api::AppState { report });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(lt_switchover_sim::api::serve(state, addr)) {
        eprintln!("error: API server failed: {e}");
        process::exit(1);
    }
}

#[cfg(not(feature = "api"))]
fn serve(_report: DrillReport, _port: u16) {
    eprintln!("error: --serve requires building with `--features api`");
    process::exit(1);
}

#[cfg(feature = "tui")]
fn run_tui() {
    if let Err(e) = lt_switchover_sim::tui::run() {
        eprintln!("error: TUI crashed: {e}");
        process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn run_tui() {
    eprintln!("error: --tui requires building with `--features tui`");
    process::exit(1);
}
