mod command_line;
mod config;
mod contracts;
mod deploy;
mod game;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use command_line::{is_usage_failure, CommandLine};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cmd = match CommandLine::try_parse() {
        Ok(cmd) => cmd,
        Err(e) => {
            let _ = e.print();
            return if is_usage_failure(&e) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    match cmd.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}
