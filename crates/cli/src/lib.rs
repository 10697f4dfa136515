pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "frontdesk",
    about = "Frontdesk operator CLI",
    long_about = "Operate the university front-desk assistant: schema migrations, demo data, readiness checks, and one-off chat turns.",
    after_help = "Examples:\n  frontdesk migrate\n  frontdesk doctor --json\n  frontdesk ask \"¿Cuántos estudiantes hay en total?\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo intents, careers, and students, then verify their row counts")]
    Seed,
    #[command(about = "Validate config, DB connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Send one message to the assistant and print the structured reply")]
    Ask {
        #[arg(long, help = "Session identifier used to persist the exchange")]
        session: Option<String>,
        #[arg(help = "Message text, as a student would type it")]
        message: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Ask { session, message } => commands::ask::run(&message, session.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
