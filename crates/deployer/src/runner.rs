//! The deployment flow: acquire the contract factory, deploy one instance and
//! call `mintGMKit()` on it twice. Every step runs exactly once and in order,
//! the first failure ends the run.

use {
    alloy::primitives::{Address, TxHash},
    anyhow::{Context, Result},
    contracts::ContractFactory,
    std::sync::Arc,
    tokio::task::JoinSet,
};

/// Handle of a submitted but not yet confirmed deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeployment {
    pub tx_hash: TxHash,
}

/// A contract whose deployment transaction got confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedContract {
    pub address: Address,
    pub deployment_tx: TxHash,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract: DeployedContract,
    /// `mintGMKit()` transactions in submission order.
    pub mints: Vec<TxHash>,
}

/// Everything the runner needs from the chain and the compiled artifacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Chain: Send + Sync + 'static {
    /// Resolves the factory of the contract called `name`.
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory>;

    /// Submits the creation transaction. Returns as soon as the node accepted
    /// it.
    async fn deploy(&self, factory: &ContractFactory) -> Result<PendingDeployment>;

    /// Suspends until the creation transaction is confirmed.
    async fn await_deployed(&self, deployment: PendingDeployment) -> Result<DeployedContract>;

    /// Submits a `mintGMKit()` call. Returns as soon as the node accepted it.
    async fn mint_gm_kit(&self, contract: Address) -> Result<TxHash>;

    /// Suspends until `tx` is confirmed.
    async fn wait(&self, tx: TxHash) -> Result<()>;
}

/// How the runner treats the confirmation of the `mintGMKit()` transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MintConfirmations {
    /// Request the confirmation wait but never act on its outcome. The next
    /// mint may be submitted before the previous one is confirmed and waits
    /// still pending at the end of the run are abandoned.
    #[default]
    Detached,
    /// Every mint has to be confirmed before the next step, a failed
    /// confirmation fails the run.
    Awaited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Stage {
    NotStarted,
    FactoryAcquired,
    Deployed,
    FirstMintSubmitted,
    SecondMintSubmitted,
    Done,
}

/// A failed run together with the last stage it reached.
#[derive(Debug, thiserror::Error)]
#[error("deployment failed after reaching stage {stage}")]
pub struct Failure {
    pub stage: Stage,
    #[source]
    pub source: anyhow::Error,
}

type Confirmation = (TxHash, Result<()>);

pub struct Runner<C> {
    chain: Arc<C>,
    contract: String,
    mint_confirmations: MintConfirmations,
}

impl<C: Chain> Runner<C> {
    pub fn new(
        chain: Arc<C>,
        contract: impl Into<String>,
        mint_confirmations: MintConfirmations,
    ) -> Self {
        Self {
            chain,
            contract: contract.into(),
            mint_confirmations,
        }
    }

    pub async fn run(&self) -> Result<Deployment, Failure> {
        let mut stage = Stage::NotStarted;
        let result = self.advance(&mut stage).await;
        result.map_err(|source| Failure { stage, source })
    }

    async fn advance(&self, stage: &mut Stage) -> Result<Deployment> {
        let factory = self
            .chain
            .contract_factory(&self.contract)
            .await
            .with_context(|| format!("could not acquire contract factory for {}", self.contract))?;
        transition(stage, Stage::FactoryAcquired);

        let pending = self
            .chain
            .deploy(&factory)
            .await
            .with_context(|| format!("could not deploy {}", factory.name()))?;
        tracing::debug!(tx = ?pending.tx_hash, "deployment submitted");
        let contract = self
            .chain
            .await_deployed(pending)
            .await
            .with_context(|| format!("deployment {} was not confirmed", pending.tx_hash))?;
        transition(stage, Stage::Deployed);
        tracing::info!("GM contract deployed to {}", contract.address);

        let mut confirmations = JoinSet::new();
        let mut mints = Vec::new();
        for submitted in [Stage::FirstMintSubmitted, Stage::SecondMintSubmitted] {
            let tx = self
                .chain
                .mint_gm_kit(contract.address)
                .await
                .context("could not submit mintGMKit()")?;
            transition(stage, submitted);
            tracing::debug!(?tx, "mintGMKit() submitted");
            mints.push(tx);

            match self.mint_confirmations {
                MintConfirmations::Awaited => self
                    .chain
                    .wait(tx)
                    .await
                    .with_context(|| format!("mintGMKit() transaction {tx} was not confirmed"))?,
                MintConfirmations::Detached => {
                    let chain = self.chain.clone();
                    confirmations.spawn(async move { (tx, chain.wait(tx).await) });
                }
            }
        }
        if !confirmations.is_empty() {
            // Let the detached waits get requested before abandoning them.
            tokio::task::yield_now().await;
        }
        abandon(confirmations);

        transition(stage, Stage::Done);
        Ok(Deployment { contract, mints })
    }
}

fn transition(stage: &mut Stage, next: Stage) {
    tracing::debug!(from = %stage, to = %next, "stage transition");
    *stage = next;
}

/// Logs the detached confirmations that already finished and aborts the
/// rest. Their outcome never influences the run.
fn abandon(mut confirmations: JoinSet<Confirmation>) {
    while let Some(joined) = confirmations.try_join_next() {
        match joined {
            Ok((tx, Ok(()))) => tracing::debug!(?tx, "mintGMKit() confirmed"),
            Ok((tx, Err(err))) => tracing::debug!(?tx, ?err, "mintGMKit() confirmation failed"),
            Err(err) => tracing::debug!(?err, "confirmation task failed"),
        }
    }
    if !confirmations.is_empty() {
        tracing::debug!(
            pending = confirmations.len(),
            "abandoning pending mintGMKit() confirmations"
        );
    }
}
