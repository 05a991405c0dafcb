use std::env;
use std::io;
use std::process::ExitCode;

use engine::codec::FIELD_MAX;
use score_cli::{parse_command, run};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let kind = parse_command(&args)?;
    run(kind, &mut io::stdout())
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "score_cli - inspect packed leaderboard scores".to_string(),
        String::new(),
        "Usage:".to_string(),
        "  score_cli encode <time_seconds> <kills>".to_string(),
        "  score_cli decode <encoded>".to_string(),
        "  score_cli records <path-to-records.json>".to_string(),
        String::new(),
        format!("encode rejects fields outside 0..={FIELD_MAX}."),
    ]
    .join("\n")
}
