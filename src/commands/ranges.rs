use std::fs;
use std::path::Path;

use line_status::utils::is_interactive_terminal;
use line_status::{
    ChangeRange, ImaraLineDiffer, LineStatusTracker, RangeKind, RangeStats, TextBuffer,
    TrackerConfig, TrackerError,
};
use serde::Serialize;

#[derive(Serialize)]
struct RangeOutput<'a> {
    kind: RangeKind,
    #[serde(flatten)]
    range: &'a ChangeRange,
}

#[derive(Serialize)]
struct RangesOutput<'a> {
    ranges: Vec<RangeOutput<'a>>,
    summary: RangeStats,
}

pub fn handle_ranges(args: &[String]) {
    let mut json_output = false;
    let mut config_path: Option<String> = None;
    let mut incremental: Option<String> = None;
    let mut positional: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                json_output = true;
                i += 1;
            }
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("--config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i + 1].clone());
                i += 2;
            }
            "--incremental" => {
                if i + 1 >= args.len() {
                    eprintln!("--incremental requires a policy argument");
                    std::process::exit(1);
                }
                incremental = Some(args[i + 1].clone());
                i += 2;
            }
            arg if arg.starts_with("--") => {
                eprintln!("Unknown ranges option: {}", arg);
                std::process::exit(1);
            }
            arg => {
                positional.push(arg);
                i += 1;
            }
        }
    }

    let [base_path, working_path] = positional[..] else {
        eprintln!(
            "Usage: line-status ranges <base> <working> [--json] [--config <path>] [--incremental <policy>]"
        );
        std::process::exit(1);
    };

    let config = match load_config(config_path.as_deref(), incremental.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = run_ranges(base_path, working_path, config, json_output) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_ranges(
    base_path: &str,
    working_path: &str,
    config: TrackerConfig,
    json: bool,
) -> Result<(), TrackerError> {
    let base = fs::read_to_string(base_path)?;
    let buffer = TextBuffer::new(fs::read_to_string(working_path)?);
    let tracker = LineStatusTracker::with_differ(&buffer, base, ImaraLineDiffer::default(), config);

    let ranges = tracker.ranges(&buffer);
    let summary = RangeStats::from_ranges(&ranges);

    if json {
        let output = RangesOutput {
            ranges: ranges
                .iter()
                .map(|range| RangeOutput {
                    kind: range.kind(),
                    range,
                })
                .collect(),
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if ranges.is_empty() {
        eprintln!("No changes");
        return Ok(());
    }

    let (red, green, reset) = if is_interactive_terminal() {
        ("\x1b[31m", "\x1b[32m", "\x1b[0m")
    } else {
        ("", "", "")
    };
    let base_buffer = tracker.base_revision();
    for range in ranges.iter() {
        println!("{}", format_header(range));
        for line in base_buffer.lines_in(range.vcs_line1(), range.vcs_line2()) {
            println!("{}-{}{}", red, line, reset);
        }
        for line in buffer.lines_in(range.line1(), range.line2()) {
            println!("{}+{}{}", green, line, reset);
        }
    }
    println!(
        "{} range(s): {} modified, {} inserted, {} deleted (+{} -{})",
        ranges.len(),
        summary.modified,
        summary.inserted,
        summary.deleted,
        summary.added_lines,
        summary.removed_lines
    );
    Ok(())
}

/// Unified diff style hunk header with 1-based starts. An empty side points at the line
/// before it, as `diff -u` does.
fn format_header(range: &ChangeRange) -> String {
    let start = |line1: usize, count: usize| if count == 0 { line1 } else { line1 + 1 };
    format!(
        "@@ -{},{} +{},{} @@ {}",
        start(range.vcs_line1(), range.vcs_line_count()),
        range.vcs_line_count(),
        start(range.line1(), range.line_count()),
        range.line_count(),
        range.kind()
    )
}

/// Tracker settings from `--config`, or the environment when no file is given.
/// `--incremental` overrides the policy from either source.
pub fn load_config(
    config_path: Option<&str>,
    incremental: Option<&str>,
) -> Result<TrackerConfig, TrackerError> {
    let mut config = match config_path {
        Some(path) => TrackerConfig::load_file(Path::new(path))?,
        None => TrackerConfig::get().clone(),
    };
    if let Some(policy) = incremental {
        config.incremental = policy.parse()?;
    }
    Ok(config)
}
