pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "kudos",
    about = "Kudos bot operator CLI",
    long_about = "Inspect kudos bot configuration, check Slack and Google Sheets readiness, and preview rendered kudos messages.",
    after_help = "Examples:\n  kudos doctor --json\n  kudos config\n  kudos sheets-test\n  kudos preview --recipient '{\"type\":\"rich_text\",\"elements\":[]}' --message '...'"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, Slack token readiness, and Google Sheets readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Append a test recognition row to the configured Google Sheet")]
    SheetsTest,
    #[command(about = "Render the kudos message a submission would post, without calling Slack")]
    Preview {
        #[arg(long, help = "Rich text JSON of the coworker field")]
        recipient: String,
        #[arg(long, help = "Rich text JSON of the message field")]
        message: String,
        #[arg(long = "type", help = "Recognition type key, e.g. helping_hand")]
        recognition_type: Option<String>,
        #[arg(long, default_value = "U00SENDER", help = "Slack user id of the sender")]
        sender: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::SheetsTest => commands::sheets_test::run(),
        Command::Preview { recipient, message, recognition_type, sender } => {
            commands::preview::run(&commands::preview::PreviewRequest {
                recipient_json: recipient,
                message_json: message,
                recognition_type,
                sender_id: sender,
            })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
