//! [`Chain`] implementation that talks to an Ethereum node through alloy and
//! reads contract factories from compiled artifacts.

use {
    crate::runner::{Chain, DeployedContract, PendingDeployment},
    alloy::{
        contract::Error as ContractError,
        network::TransactionBuilder,
        primitives::{Address, TxHash},
        providers::{PendingTransactionBuilder, Provider},
        rpc::types::{TransactionReceipt, TransactionRequest},
        transports::RpcError,
    },
    anyhow::{Context, Result},
    contracts::{Artifacts, ContractFactory, alloy::GoodMorning},
    ethrpc::Web3,
};

pub struct Web3Chain {
    web3: Web3,
    artifacts: Artifacts,
    required_confirmations: u64,
}

impl Web3Chain {
    pub fn new(web3: Web3, artifacts: Artifacts, required_confirmations: u64) -> Self {
        Self {
            web3,
            artifacts,
            required_confirmations,
        }
    }

    /// Watches `tx` until it has the required number of confirmations and
    /// fails if it reverted.
    async fn confirm(&self, tx: TxHash) -> Result<TransactionReceipt> {
        let receipt = PendingTransactionBuilder::new(self.web3.alloy.root().clone(), tx)
            .with_required_confirmations(self.required_confirmations)
            .get_receipt()
            .await
            .with_context(|| format!("could not fetch receipt of transaction {tx}"))?;
        anyhow::ensure!(receipt.status(), "transaction {tx} reverted");
        tracing::debug!(
            ?tx,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "transaction confirmed"
        );
        Ok(receipt)
    }
}

#[async_trait::async_trait]
impl Chain for Web3Chain {
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory> {
        let factory = self.artifacts.contract_factory(name)?;
        factory.ensure_function(GoodMorning::MINT_GM_KIT)?;
        tracing::debug!(
            name,
            artifact = %factory.path().display(),
            "acquired contract factory"
        );
        Ok(factory)
    }

    async fn deploy(&self, factory: &ContractFactory) -> Result<PendingDeployment> {
        let tx = TransactionRequest::default()
            .from(self.web3.address())
            .with_deploy_code(factory.bytecode().clone());
        let pending = self
            .web3
            .alloy
            .send_transaction(tx)
            .await
            .context("node rejected the creation transaction")?;
        Ok(PendingDeployment {
            tx_hash: *pending.tx_hash(),
        })
    }

    async fn await_deployed(&self, deployment: PendingDeployment) -> Result<DeployedContract> {
        let receipt = self.confirm(deployment.tx_hash).await?;
        let address = receipt.contract_address.with_context(|| {
            format!(
                "receipt of transaction {} carries no contract address",
                deployment.tx_hash
            )
        })?;
        Ok(DeployedContract {
            address,
            deployment_tx: deployment.tx_hash,
        })
    }

    async fn mint_gm_kit(&self, contract: Address) -> Result<TxHash> {
        let pending = GoodMorning::Instance::new(contract, self.web3.alloy.clone())
            .mintGMKit()
            .send()
            .await
            .map_err(|err| {
                let reason = submission_failure(&err);
                anyhow::Error::from(err).context(reason)
            })?;
        Ok(*pending.tx_hash())
    }

    async fn wait(&self, tx: TxHash) -> Result<()> {
        self.confirm(tx).await.map(|_| ())
    }
}

/// Why the node refused a `mintGMKit()` submission. Reverts surface during gas
/// estimation and carry revert data.
fn submission_failure(err: &ContractError) -> &'static str {
    match err {
        ContractError::TransportError(RpcError::ErrorResp(payload))
            if payload.as_revert_data().is_some() =>
        {
            "mintGMKit() would revert"
        }
        ContractError::TransportError(_) => "node did not accept mintGMKit()",
        _ => "could not build mintGMKit() transaction",
    }
}
