use crate::server;
use crate::sheets::{
    run_audit_score, run_review_score, run_weights, AuditScoreArgs, ReviewScoreArgs,
};
use clap::{Args, Parser, Subcommand};
use giraffe_quality::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Giraffe Quality",
    about = "Run the Giraffe Kitchens quality service or score sheets offline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score manager review sheets
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },
    /// Score sanitation audit sheets
    Audit {
        #[command(subcommand)]
        command: AuditCommand,
    },
    /// Print the manager review weight table
    Weights,
}

#[derive(Subcommand, Debug)]
enum ReviewCommand {
    /// Compute group and overall scores from a CSV score sheet
    Score(ReviewScoreArgs),
}

#[derive(Subcommand, Debug)]
enum AuditCommand {
    /// Compute deductions and the audit score from a CSV sheet
    Score(AuditScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Review {
            command: ReviewCommand::Score(args),
        } => run_review_score(args),
        Command::Audit {
            command: AuditCommand::Score(args),
        } => run_audit_score(args),
        Command::Weights => run_weights(),
    }
}
