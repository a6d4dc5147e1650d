mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use commands::RunOptions;

pub(crate) const EXIT_SUCCESS: i32 = 0;
/// The run finished but the report was not produced.
pub(crate) const EXIT_FAILURE: i32 = 1;
pub(crate) const EXIT_INTERRUPTED: i32 = 2;
/// Configuration or runtime error.
pub(crate) const EXIT_ERROR: i32 = 3;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Execution report generator for automation logs.
#[derive(Parser)]
#[command(
    name = "runlog",
    version,
    about = "Execution report generator for automation logs"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress streamed output and informational logs
    #[arg(long, global = true)]
    quiet: bool,

    /// Defaults to `run`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report for the latest execution of both regions
    Run {
        /// Wait for the complete response instead of streaming it
        #[arg(long)]
        no_stream: bool,
        /// TOML file with `system` and `user` prompt templates
        #[arg(long)]
        prompts: Option<PathBuf>,
    },

    /// Show the model provider's account balance
    Balance,

    /// Print the log content that would be sent, without calling the model
    Preview {
        /// TOML file with `system` and `user` prompt templates
        #[arg(long)]
        prompts: Option<PathBuf>,
        /// Print the full user prompt instead of the bare log block
        #[arg(long)]
        render: bool,
    },

    /// Print a stored report
    Show {
        /// Report id
        id: u64,
    },
}

fn main() {
    config::load_dotenv();
    let cli = Cli::parse();
    logging::init_tracing(cli.quiet);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {}", e);
            process::exit(EXIT_ERROR);
        }
    };

    let code = runtime.block_on(async {
        tokio::select! {
            code = dispatch(cli) => code,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nInterrupted");
                EXIT_INTERRUPTED
            }
        }
    });
    process::exit(code);
}

async fn dispatch(cli: Cli) -> i32 {
    let command = cli.command.unwrap_or(Commands::Run {
        no_stream: false,
        prompts: None,
    });

    let result = match command {
        Commands::Run { no_stream, prompts } => {
            commands::cmd_run(RunOptions {
                stream: !no_stream,
                prompts: prompts.as_deref(),
                output: cli.output,
                quiet: cli.quiet,
            })
            .await
        }
        Commands::Balance => commands::cmd_balance(cli.output).await,
        Commands::Preview { prompts, render } => {
            commands::cmd_preview(prompts.as_deref(), render, cli.output).await
        }
        Commands::Show { id } => commands::cmd_show(id, cli.output).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            EXIT_ERROR
        }
    }
}
