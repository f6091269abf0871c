use std::{sync::Arc, time::Duration};

use anyhow::Result;
use ethers::{
    contract::{Contract, ContractFactory, FunctionCall},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{H160, H256, U256},
    utils::hex,
};

use crate::{
    config::GameConfig,
    contracts::Artifacts,
    game::{GameAction, GameChain},
    utils::{ensure_success, wait_transaction, with_timeout, Client},
};

/// JSON-RPC backed [`GameChain`] signing with a local key.
pub struct Deploy {
    client: Arc<Client>,
    artifacts: Artifacts,
    timeout: Duration,
    poll_interval: Duration,
}

impl Deploy {
    pub async fn new(
        rpc: &str,
        sk: &str,
        artifacts: Artifacts,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self> {
        let wallet = wallet_from_hex(sk)?;
        let provider = Provider::<Http>::try_from(rpc)?.interval(poll_interval);

        let chain_id = with_timeout(timeout, "chain id", provider.get_chainid()).await?;
        let wallet = wallet.with_chain_id(chain_id.as_u64());
        log::info!("deployer {:?} on chain {}", wallet.address(), chain_id);

        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        Ok(Self::with_client(client, artifacts, timeout, poll_interval))
    }

    pub fn with_client(
        client: Arc<Client>,
        artifacts: Artifacts,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            artifacts,
            timeout,
            poll_interval,
        }
    }
}

/// Parses a hex private key, with or without the `0x` prefix.
pub fn wallet_from_hex(sk: &str) -> Result<LocalWallet> {
    Ok(LocalWallet::from_bytes(&hex::decode(
        sk.strip_prefix("0x").unwrap_or(sk),
    )?)?)
}

fn action_call(
    contract: &Contract<Client>,
    action: GameAction,
) -> Result<FunctionCall<Arc<Client>, Client, ()>> {
    let call = match action {
        GameAction::MintCharacterNft { character_index } => {
            contract.method::<_, ()>(action.method(), U256::from(character_index))?
        }
        GameAction::AttackBoss => contract.method::<_, ()>(action.method(), ())?,
    };
    Ok(call.legacy())
}

impl GameChain for Deploy {
    type Factory = ContractFactory<Client>;
    type Contract = Contract<Client>;

    async fn contract_factory(&self, name: &str) -> Result<Self::Factory> {
        let compiled = self.artifacts.load(name)?;
        Ok(ContractFactory::new(
            compiled.abi,
            compiled.bytecode,
            self.client.clone(),
        ))
    }

    async fn deploy(&self, factory: Self::Factory, config: &GameConfig) -> Result<Self::Contract> {
        let deployer = factory.deploy_tokens(config.constructor_args())?.legacy();
        let (contract, receipt) =
            with_timeout(self.timeout, "deployment", deployer.send_with_receipt()).await?;
        log::info!("deployment transaction hash:{:?}", receipt.transaction_hash);
        ensure_success(&receipt)?;

        Ok(contract)
    }

    fn address(&self, contract: &Self::Contract) -> H160 {
        contract.address()
    }

    async fn submit(&self, contract: &Self::Contract, action: GameAction) -> Result<H256> {
        let call = action_call(contract, action)?;
        let transaction_hash = with_timeout(self.timeout, action.method(), call.send())
            .await?
            .tx_hash();
        Ok(transaction_hash)
    }

    async fn confirm(&self, transaction_hash: H256) -> Result<()> {
        let receipt = with_timeout(
            self.timeout,
            "confirmation",
            wait_transaction(self.client.clone(), transaction_hash, self.poll_interval),
        )
        .await?;
        ensure_success(&receipt)
    }
}

#[cfg(test)]
mod tests {
    use ethers::{
        abi::{self, Abi, Token},
        types::transaction::eip2718::TypedTransaction,
    };
    use tempfile::tempdir;

    use super::*;
    use crate::contracts::{write_artifact, GAME_CONTRACT};

    // Hardhat's first development account.
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    const GAME_ABI: &str = r#"[
        {"type":"constructor","stateMutability":"nonpayable","inputs":[
            {"name":"characterNames","type":"string[]"},
            {"name":"characterImageURIs","type":"string[]"},
            {"name":"characterHp","type":"uint256[]"},
            {"name":"characterAttackDmg","type":"uint256[]"},
            {"name":"bossName","type":"string"},
            {"name":"bossImageURI","type":"string"},
            {"name":"bossHp","type":"uint256"},
            {"name":"bossAttackDamage","type":"uint256"}]},
        {"type":"function","name":"mintCharacterNFT","stateMutability":"nonpayable",
            "inputs":[{"name":"_characterIndex","type":"uint256"}],"outputs":[]},
        {"type":"function","name":"attackBoss","stateMutability":"nonpayable",
            "inputs":[],"outputs":[]}
    ]"#;

    fn offline_client() -> Arc<Client> {
        let provider = Provider::<Http>::try_from("http://127.0.0.1:8545").unwrap();
        let wallet = wallet_from_hex(DEV_KEY).unwrap().with_chain_id(31337u64);
        Arc::new(SignerMiddleware::new(provider, wallet))
    }

    fn game_contract() -> Contract<Client> {
        let abi: Abi = serde_json::from_str(GAME_ABI).unwrap();
        Contract::new(H160::from_low_u64_be(0x1001), abi, offline_client())
    }

    #[test]
    fn private_key_prefix_is_optional() {
        let expected: H160 = DEV_ADDRESS.parse().unwrap();
        assert_eq!(wallet_from_hex(DEV_KEY).unwrap().address(), expected);
        assert_eq!(
            wallet_from_hex(&format!("0x{}", DEV_KEY)).unwrap().address(),
            expected
        );
        assert!(wallet_from_hex("0xnothex").is_err());
    }

    #[tokio::test]
    async fn deployment_data_is_bytecode_then_constructor_args() {
        let dir = tempdir().unwrap();
        write_artifact(
            dir.path(),
            "contracts/MyEpicGame.sol/MyEpicGame.json",
            "MyEpicGame",
            GAME_ABI,
            "0x6080604052",
        );
        let chain = Deploy::with_client(
            offline_client(),
            Artifacts::new(dir.path()),
            Duration::from_secs(1),
            Duration::from_millis(10),
        );
        let config = GameConfig::default();

        let factory = chain.contract_factory(GAME_CONTRACT).await.unwrap();
        let deployer = factory
            .deploy_tokens(config.constructor_args())
            .unwrap()
            .legacy();

        let mut expected = vec![0x60, 0x80, 0x60, 0x40, 0x52];
        expected.extend(abi::encode(&config.constructor_args()));
        assert!(matches!(deployer.tx, TypedTransaction::Legacy(_)));
        assert_eq!(deployer.tx.data().unwrap().to_vec(), expected);
    }

    #[test]
    fn mint_calls_character_two() {
        let contract = game_contract();
        let call = action_call(
            &contract,
            GameAction::MintCharacterNft { character_index: 2 },
        )
        .unwrap();

        let mut expected = hex::decode("f8b81ef7").unwrap();
        expected.extend(abi::encode(&[Token::Uint(U256::from(2))]));
        assert_eq!(call.calldata().unwrap().to_vec(), expected);
        assert_eq!(expected.len(), 36);
        assert_eq!(expected[35], 2);
    }

    #[test]
    fn attack_boss_has_no_arguments() {
        let contract = game_contract();
        let call = action_call(&contract, GameAction::AttackBoss).unwrap();
        assert_eq!(
            call.calldata().unwrap().to_vec(),
            hex::decode("d4f24c5b").unwrap()
        );
    }
}
