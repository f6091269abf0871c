use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::{
    config::GameConfig,
    contracts::{Artifacts, GAME_CONTRACT},
    deploy::Deploy,
    game::{deploy_and_play, deploy_game},
};

#[derive(Debug, Parser)]
#[clap(about = "Deploy the epic game contract and play a round against it")]
pub struct CommandLine {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deploy the game contract and print its address.
    Deploy(Options),
    /// Deploy the game contract, mint character 2 and attack the boss twice.
    Run(Options),
}

#[derive(Debug, Args)]
struct Options {
    #[clap(short, long, default_value = "http://127.0.0.1:8545")]
    rpc: String,

    #[clap(long)]
    sk: String,

    /// Hardhat artifacts directory.
    #[clap(short, long, default_value = "artifacts")]
    artifacts: PathBuf,

    #[clap(long, default_value = GAME_CONTRACT)]
    contract: String,

    /// JSON file replacing the built-in characters and boss.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Seconds to wait for each chain call.
    #[clap(short, long, default_value_t = 120)]
    timeout: u64,

    /// Milliseconds between receipt polls.
    #[clap(long, default_value_t = 1000)]
    poll_interval: u64,
}

impl Options {
    fn game_config(&self) -> Result<GameConfig> {
        match &self.config {
            Some(path) => GameConfig::load(path),
            None => Ok(GameConfig::default()),
        }
    }

    async fn chain(&self) -> Result<Deploy> {
        Deploy::new(
            &self.rpc,
            &self.sk,
            Artifacts::new(&self.artifacts),
            Duration::from_secs(self.timeout),
            Duration::from_millis(self.poll_interval),
        )
        .await
    }
}

/// Whether a clap parse error is a real usage error rather than `--help` or
/// `--version` output.
pub fn is_usage_failure(err: &clap::Error) -> bool {
    err.use_stderr()
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Command::Deploy(options) => {
                let config = options.game_config()?;
                let chain = options.chain().await?;
                let deployment = deploy_game(&chain, &options.contract, &config).await?;
                println!("Contract deployed to: {:?}", deployment.address);
            }
            Command::Run(options) => {
                let config = options.game_config()?;
                let chain = options.chain().await?;
                let report = deploy_and_play(&chain, &options.contract, &config, |deployment| {
                    println!("Contract deployed to: {:?}", deployment.address)
                })
                .await?;
                for (action, transaction_hash) in &report.transactions {
                    log::info!("{} in {:?}", action, transaction_hash);
                }
                println!("Done!");
            }
        }
        Ok(())
    }
}
