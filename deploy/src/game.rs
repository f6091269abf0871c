use std::fmt;

use anyhow::{Context, Result};
use ethers::types::{H160, H256};

use crate::config::GameConfig;

/// Character minted by the play sequence (zero-based, Anu in the default roster).
pub const MINT_CHARACTER_INDEX: u64 = 2;

/// A state-changing call on the deployed game contract.
///
/// `AttackBoss` requires a previously confirmed `MintCharacterNft` from the
/// same account; the contract owns that rule, callers order the calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    MintCharacterNft { character_index: u64 },
    AttackBoss,
}

impl GameAction {
    pub fn method(&self) -> &'static str {
        match self {
            GameAction::MintCharacterNft { .. } => "mintCharacterNFT",
            GameAction::AttackBoss => "attackBoss",
        }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameAction::MintCharacterNft { character_index } => {
                write!(f, "{}({})", self.method(), character_index)
            }
            GameAction::AttackBoss => write!(f, "{}()", self.method()),
        }
    }
}

pub fn play_sequence() -> [GameAction; 3] {
    [
        GameAction::MintCharacterNft {
            character_index: MINT_CHARACTER_INDEX,
        },
        GameAction::AttackBoss,
        GameAction::AttackBoss,
    ]
}

/// Chain operations the deploy procedures need.
#[allow(async_fn_in_trait)]
pub trait GameChain {
    type Factory;
    type Contract;

    /// Resolves a deployable factory for the named contract artifact.
    async fn contract_factory(&self, name: &str) -> Result<Self::Factory>;

    /// Deploys with `config`'s constructor arguments and returns once the
    /// deployment is mined.
    async fn deploy(&self, factory: Self::Factory, config: &GameConfig) -> Result<Self::Contract>;

    fn address(&self, contract: &Self::Contract) -> H160;

    async fn submit(&self, contract: &Self::Contract, action: GameAction) -> Result<H256>;

    async fn confirm(&self, transaction_hash: H256) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: H160,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayReport {
    pub address: H160,
    pub transactions: Vec<(GameAction, H256)>,
}

pub async fn deploy_game<C: GameChain>(
    chain: &C,
    contract_name: &str,
    config: &GameConfig,
) -> Result<Deployment> {
    config.validate()?;
    let (_, deployment) = deploy_contract(chain, contract_name, config).await?;
    Ok(deployment)
}

/// Deploys a fresh game and plays [`play_sequence`] against it. Each action
/// is confirmed before the next one is submitted; nothing is undone when a
/// later action fails.
///
/// `on_deployed` runs once the deployment is mined, before the first action.
/// Errors from the play sequence name the deployed address.
pub async fn deploy_and_play<C, F>(
    chain: &C,
    contract_name: &str,
    config: &GameConfig,
    on_deployed: F,
) -> Result<PlayReport>
where
    C: GameChain,
    F: FnOnce(&Deployment),
{
    config.validate()?;
    config.check_character(MINT_CHARACTER_INDEX)?;

    let (contract, deployment) = deploy_contract(chain, contract_name, config).await?;
    on_deployed(&deployment);

    let transactions = play(chain, &contract)
        .await
        .with_context(|| format!("playing game deployed at {:?}", deployment.address))?;

    Ok(PlayReport {
        address: deployment.address,
        transactions,
    })
}

async fn play<C: GameChain>(chain: &C, contract: &C::Contract) -> Result<Vec<(GameAction, H256)>> {
    let mut transactions = Vec::new();
    for action in play_sequence() {
        let transaction_hash = chain.submit(contract, action).await?;
        log::info!("{} transaction hash:{:?}", action, transaction_hash);
        chain.confirm(transaction_hash).await?;
        log::info!("{} confirmed", action);
        transactions.push((action, transaction_hash));
    }
    Ok(transactions)
}

async fn deploy_contract<C: GameChain>(
    chain: &C,
    contract_name: &str,
    config: &GameConfig,
) -> Result<(C::Contract, Deployment)> {
    let factory = chain.contract_factory(contract_name).await?;
    let contract = chain.deploy(factory, config).await?;
    let address = chain.address(&contract);
    log::info!("{} deployed at {:?}", contract_name, address);

    Ok((contract, Deployment { address }))
}
