use std::fs;

use line_status::{ImaraLineDiffer, LineBuffer, LineStatusTracker, TextBuffer, TrackerError};

use crate::commands::ranges::load_config;

pub fn handle_rollback(args: &[String]) {
    let mut in_place = false;
    let mut line_spec: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut incremental: Option<String> = None;
    let mut positional: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--in-place" => {
                in_place = true;
                i += 1;
            }
            "--lines" | "--config" | "--incremental" => {
                if i + 1 >= args.len() {
                    eprintln!("{} requires a value", args[i]);
                    std::process::exit(1);
                }
                let value = Some(args[i + 1].clone());
                match args[i].as_str() {
                    "--lines" => line_spec = value,
                    "--config" => config_path = value,
                    _ => incremental = value,
                }
                i += 2;
            }
            arg if arg.starts_with("--") => {
                eprintln!("Unknown rollback option: {}", arg);
                std::process::exit(1);
            }
            arg => {
                positional.push(arg);
                i += 1;
            }
        }
    }

    let [base_path, working_path] = positional[..] else {
        exit_with_usage();
    };
    let Some(line_spec) = line_spec else {
        exit_with_usage();
    };

    if let Err(e) = run_rollback(
        base_path,
        working_path,
        &line_spec,
        config_path.as_deref(),
        incremental.as_deref(),
        in_place,
    ) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn exit_with_usage() -> ! {
    eprintln!(
        "Usage: line-status rollback <base> <working> --lines <spec> [--in-place] [--config <path>] [--incremental <policy>]"
    );
    std::process::exit(1);
}

fn run_rollback(
    base_path: &str,
    working_path: &str,
    line_spec: &str,
    config_path: Option<&str>,
    incremental: Option<&str>,
    in_place: bool,
) -> Result<(), TrackerError> {
    let lines = parse_line_spec(line_spec)?;
    let base = fs::read_to_string(base_path)?;
    let mut buffer = TextBuffer::new(fs::read_to_string(working_path)?);
    let config = load_config(config_path, incremental)?;
    let tracker = LineStatusTracker::with_differ(&buffer, base, ImaraLineDiffer::default(), config);

    let rolled_back = tracker.rollback_lines(&mut buffer, lines)?;
    let remaining = tracker.ranges(&buffer).len();
    tracker.release();

    if in_place {
        fs::write(working_path, buffer.as_str())?;
    } else {
        print!("{}", buffer.as_str());
        if !buffer.is_empty() && !buffer.as_str().ends_with('\n') {
            println!();
        }
    }
    eprintln!(
        "Rolled back {} range(s), {} remaining",
        rolled_back, remaining
    );
    Ok(())
}

/// Parses `3,5-7` style 1-based line lists into 0-based line numbers.
fn parse_line_spec(spec: &str) -> Result<Vec<usize>, TrackerError> {
    let invalid = |part: &str| TrackerError::Generic(format!("Invalid line selection: {}", part));
    let parse_line = |part: &str, text: &str| -> Result<usize, TrackerError> {
        match text.trim().parse::<usize>() {
            Ok(line) if line > 0 => Ok(line - 1),
            _ => Err(invalid(part)),
        }
    };

    let mut lines = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_line(part, start)?;
                let end = parse_line(part, end)?;
                if start > end {
                    return Err(invalid(part));
                }
                lines.extend(start..=end);
            }
            None => lines.push(parse_line(part, part)?),
        }
    }
    if lines.is_empty() {
        return Err(invalid(spec));
    }
    Ok(lines)
}
