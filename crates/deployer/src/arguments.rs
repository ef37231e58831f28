use {
    crate::runner::MintConfirmations,
    alloy::signers::local::PrivateKeySigner,
    anyhow::Result,
    contracts::alloy::GoodMorning,
    ethrpc::alloy::wallet,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[derive(clap::Parser)]
#[clap(
    name = "gm-deploy",
    about = "Deploys the GoodMorning contract and mints two GM kits"
)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Hex encoded private key of the deploying account. Takes precedence
    /// over the mnemonic.
    #[clap(long, env)]
    pub private_key: Option<String>,

    /// BIP-39 mnemonic the deploying account is derived from. Defaults to the
    /// mnemonic of the prefunded accounts of local development nodes.
    #[clap(long, env, default_value = wallet::DEV_MNEMONIC)]
    pub mnemonic: String,

    /// Index of the deploying account on the mnemonic's derivation path.
    #[clap(long, env, default_value = "0")]
    pub account_index: u32,

    /// Directory with the compiled contract artifacts (Hardhat's `artifacts`
    /// or Foundry's `out`).
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Contract to deploy. Either a bare contract name or a fully qualified
    /// one like `contracts/GoodMorning.sol:GoodMorning`, which is looked up in
    /// Hardhat's and Foundry's artifact layouts.
    #[clap(long, env, default_value = GoodMorning::NAME)]
    pub contract: String,

    /// Number of blocks a transaction needs to be buried under before it
    /// counts as confirmed.
    #[clap(long, env, default_value = "1")]
    pub required_confirmations: u64,

    /// Whether the run waits for every mintGMKit() transaction to be confirmed
    /// before it continues.
    #[clap(long, env, value_enum, default_value_t)]
    pub mint_confirmations: MintConfirmations,
}

#[derive(clap::Parser)]
pub struct LoggingArguments {
    #[clap(
        long,
        env,
        default_value = "warn,gm_deploy=info,deployer=info,contracts=info,ethrpc=info"
    )]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Emit log events as JSON.
    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl LoggingArguments {
    pub fn to_config(&self) -> observe::Config {
        observe::Config::new(
            &self.log_filter,
            self.log_stderr_threshold.into_level(),
            self.use_json_logs,
        )
    }
}

impl Arguments {
    /// The signer of the deploying account.
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        match &self.private_key {
            Some(key) => wallet::private_key_signer(key),
            None => wallet::mnemonic_signer(&self.mnemonic, self.account_index),
        }
    }
}

pub fn display_secret_option<T>(
    f: &mut Formatter<'_>,
    name: &str,
    option: &Option<T>,
) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(_) => writeln!(f, "SECRET"),
        None => writeln!(f, "None"),
    }
}

// We have a custom Display implementation so that we can log the arguments on
// start up without leaking any potentially secret values.
impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Self {
            logging,
            node_url,
            private_key,
            mnemonic: _,
            account_index,
            artifacts,
            contract,
            required_confirmations,
            mint_confirmations,
        } = self;

        let LoggingArguments {
            log_filter,
            log_stderr_threshold,
            use_json_logs,
        } = logging;
        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        writeln!(f, "node_url: {node_url}")?;
        display_secret_option(f, "private_key", private_key)?;
        writeln!(f, "mnemonic: SECRET")?;
        writeln!(f, "account_index: {account_index}")?;
        writeln!(f, "artifacts: {}", artifacts.display())?;
        writeln!(f, "contract: {contract}")?;
        writeln!(f, "required_confirmations: {required_confirmations}")?;
        writeln!(f, "mint_confirmations: {mint_confirmations}")?;
        Ok(())
    }
}
