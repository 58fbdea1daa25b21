use std::env;
use std::path::PathBuf;

/// Default port for `--serve`.
pub const DEFAULT_PORT: u16 = 3000;
/// Default seed for `--soak`.
pub const DEFAULT_SEED: u64 = 42;
/// Preset used when no drill source is given.
pub const DEFAULT_PRESET: &str = "total_eb_fail";

/// Where a drill comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrillSource {
    File(PathBuf),
    Preset(String),
}

/// What the binary runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Drill(DrillSource),
    Soak { ticks: u64, seed: u64 },
    Tui,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub mode: Mode,
    pub events_out: Option<PathBuf>,
    pub timeline_out: Option<PathBuf>,
    pub serve: bool,
    pub port: u16,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut drill = None;
    let mut preset = None;
    let mut events_out = None;
    let mut timeline_out = None;
    let mut soak = None;
    let mut seed = None;
    let mut tui = false;
    let mut serve = false;
    let mut port = None;

    while i < args.len() {
        match args[i].as_str() {
            "--drill" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --drill (expected a TOML file path)")?;
                if drill.replace(PathBuf::from(path)).is_some() {
                    return Err("--drill provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--events-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --events-out (expected a file path)")?;
                if events_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--events-out provided more than once".to_string());
                }
            }
            "--timeline-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --timeline-out (expected a file path)")?;
                if timeline_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--timeline-out provided more than once".to_string());
                }
            }
            "--soak" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --soak (expected a tick count)")?;
                let ticks = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--soak value \"{raw}\" is not a valid u64"))?;
                if soak.replace(ticks).is_some() {
                    return Err("--soak provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let value = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                if seed.replace(value).is_some() {
                    return Err("--seed provided more than once".to_string());
                }
            }
            "--tui" => tui = true,
            "--serve" => serve = true,
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let value = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                port = Some(value);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if drill.is_some() && preset.is_some() {
        return Err(
            "arguments `--drill` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    let has_drill_source = drill.is_some() || preset.is_some();
    let has_exports = events_out.is_some() || timeline_out.is_some();

    if seed.is_some() && soak.is_none() {
        return Err("`--seed` only applies to `--soak`".to_string());
    }
    if port.is_some() && !serve {
        return Err("`--port` only applies to `--serve`".to_string());
    }

    let mode = if tui {
        if has_drill_source || soak.is_some() || serve || has_exports {
            return Err("`--tui` runs an interactive session and takes no other mode".to_string());
        }
        Mode::Tui
    } else if let Some(ticks) = soak {
        if has_drill_source || serve || has_exports {
            return Err(
                "`--soak` cannot be combined with drill, export or serve options".to_string(),
            );
        }
        Mode::Soak {
            ticks,
            seed: seed.unwrap_or(DEFAULT_SEED),
        }
    } else {
        let source = match (drill, preset) {
            (Some(path), _) => DrillSource::File(path),
            (None, Some(name)) => DrillSource::Preset(name),
            (None, None) => DrillSource::Preset(DEFAULT_PRESET.to_string()),
        };
        Mode::Drill(source)
    };

    Ok(CliOptions {
        mode,
        events_out,
        timeline_out,
        serve,
        port: port.unwrap_or(DEFAULT_PORT),
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("lt-switchover-sim: LT power-room EB/DG/bus-coupler switchover simulator");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  lt-switchover-sim [--drill <path> | --preset <name>] [--events-out <path>] \
         [--timeline-out <path>] [--serve [--port <u16>]]"
    );
    eprintln!("  lt-switchover-sim --soak <ticks> [--seed <u64>]");
    eprintln!("  lt-switchover-sim --tui");
    eprintln!();
    eprintln!("Presets: total_eb_fail (default), eb1_fail, eb2_fail, eb1_fail_and_restore,");
    eprintln!("         full_dg_cycle, manual_changeover");
    eprintln!("--serve needs the `api` feature, --tui the `tui` feature.");
    eprintln!("Set RUST_LOG (e.g. `debug`) for developer logging on stderr.");
}
