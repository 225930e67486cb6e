use crate::commands;

pub fn handle_line_status(args: &[String]) {
    if args.is_empty() {
        print_help();
        return;
    }

    match args[0].as_str() {
        "help" | "--help" | "-h" => {
            print_help();
        }
        "version" | "--version" | "-v" => {
            if cfg!(debug_assertions) {
                println!("{} (debug)", env!("CARGO_PKG_VERSION"));
            } else {
                println!(env!("CARGO_PKG_VERSION"));
            }
            std::process::exit(0);
        }
        "ranges" => {
            commands::ranges::handle_ranges(&args[1..]);
        }
        "rollback" => {
            commands::rollback::handle_rollback(&args[1..]);
        }
        _ => {
            eprintln!("Unknown line-status command: {}", args[0]);
            print_help();
            std::process::exit(1);
        }
    }
}

fn print_help() {
    eprintln!("line-status - line-level change tracking against a base revision");
    eprintln!();
    eprintln!("Usage: line-status <command> [args...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  ranges <base> <working>     Show the changed ranges of <working> against <base>");
    eprintln!("    --json                 Output in JSON format");
    eprintln!("    --config <path>        Read tracker settings from a JSON file");
    eprintln!("    --incremental <policy> off | contained | bounded");
    eprintln!("  rollback <base> <working>   Restore base content for the selected lines");
    eprintln!("    --lines <spec>         1-based lines to roll back, e.g. 3,5-7 (required)");
    eprintln!("    --in-place             Write the result back to <working>");
    eprintln!("    --config <path>        Read tracker settings from a JSON file");
    eprintln!("    --incremental <policy> off | contained | bounded");
    eprintln!("  version, -v, --version      Print the line-status version");
    eprintln!("  help, -h, --help            Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LINE_STATUS_INCREMENTAL     off | contained | bounded");
    eprintln!("  LINE_STATUS_DEBUG           1 to print debug logs, 0 to silence them");
    eprintln!("  LINE_STATUS_DEBUG_PERFORMANCE  1 for timings, 2 for structured timings");
}
