pub mod alloy;

use {
    ::alloy::{
        network::{Ethereum, EthereumWallet, NetworkWallet},
        primitives::Address,
        providers::DynProvider,
        signers::local::PrivateKeySigner,
    },
    url::Url,
};

pub type AlloyProvider = DynProvider;

/// A provider together with the wallet that signs every transaction sent
/// through it.
#[derive(Debug, Clone)]
pub struct Web3 {
    pub alloy: AlloyProvider,
    pub wallet: EthereumWallet,
}

impl Web3 {
    /// Connects to the node at `url`. Requests are tagged with `label` in the
    /// RPC logs.
    pub fn new(url: &Url, signer: PrivateKeySigner, label: &str) -> Self {
        let wallet = EthereumWallet::new(signer);
        let alloy = crate::alloy::provider(url, wallet.clone(), label);
        Self { alloy, wallet }
    }

    /// Address of the account that signs the transactions.
    pub fn address(&self) -> Address {
        NetworkWallet::<Ethereum>::default_signer_address(&self.wallet)
    }
}
