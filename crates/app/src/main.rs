#![forbid(unsafe_code)]

mod cli;
mod error;
mod logging;
mod terminal;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use services::{Clock, SessionHost, SessionLoopService, SessionParams, ShuffleSource};
use storage::{QuestionBankRepository, Storage};

use crate::cli::{Cli, Command};
use crate::error::AppError;

async fn run(cli: Cli) -> Result<(), AppError> {
    let storage = Storage::json_file(&cli.bank);
    let shuffle = cli.seed.map_or(ShuffleSource::Thread, ShuffleSource::Seeded);
    let session_loop =
        SessionLoopService::new(Clock::system(), storage.banks.clone()).with_shuffle(shuffle);
    tracing::debug!(bank = %cli.bank.display(), ?shuffle, "bank source configured");

    match cli.command {
        Command::Subjects => {
            let bank = storage.banks.load_bank().await?;
            terminal::render_subjects(&mut io::stdout().lock(), &bank)?;
        }
        Command::Topics { subject } => {
            let bank = storage.banks.load_bank().await?;
            terminal::render_topics(&mut io::stdout().lock(), &bank, &subject)?;
        }
        Command::Test { subject, topic } => {
            let mut host = SessionHost::new();
            host.open(&session_loop, SessionParams::new(subject, topic.as_str()))
                .await?;
            terminal::run_test(
                &mut host,
                &session_loop,
                &mut io::stdin().lock(),
                &mut io::stdout().lock(),
            )?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "quiz failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
