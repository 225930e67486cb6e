mod commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "line-status")]
#[command(about = "line-level change tracking against a base revision", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Command and arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    commands::line_status_handlers::handle_line_status(&cli.args);
}
