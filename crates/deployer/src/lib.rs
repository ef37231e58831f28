pub mod arguments;
pub mod chain;
pub mod runner;
#[cfg(test)]
mod testing;

use {
    crate::{
        arguments::Arguments,
        chain::Web3Chain,
        runner::{Deployment, Runner},
    },
    alloy::providers::Provider,
    anyhow::{Context, Result},
    contracts::Artifacts,
    ethrpc::Web3,
    std::{process::ExitCode, sync::Arc},
};

/// Runs one deployment and maps its outcome to the process exit code.
pub async fn main(args: Arguments) -> ExitCode {
    match run(&args).await {
        Ok(deployment) => {
            tracing::debug!(
                contract = ?deployment.contract.address,
                mints = ?deployment.mints,
                "deployment finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("error {err:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn run(args: &Arguments) -> Result<Deployment> {
    let signer = args.signer().context("invalid deployer account")?;
    let web3 = Web3::new(&args.node_url, signer, "deployer");
    let chain_id = web3
        .alloy
        .get_chain_id()
        .await
        .with_context(|| format!("could not connect to node at {}", args.node_url))?;
    tracing::debug!(chain_id, deployer = ?web3.address(), "connected to node");

    let chain = Web3Chain::new(
        web3,
        Artifacts::new(args.artifacts.clone()),
        args.required_confirmations,
    );
    let runner = Runner::new(Arc::new(chain), &args.contract, args.mint_confirmations);
    Ok(runner.run().await?)
}
