mod instrumentation;
pub mod wallet;

use {
    crate::AlloyProvider,
    alloy::{
        network::EthereumWallet,
        providers::{Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
    },
    instrumentation::InstrumentationLayer,
    url::Url,
};

/// Creates a provider that fills and signs transactions with `wallet` before
/// sending them to the node at `url`.
pub fn provider(url: &Url, wallet: EthereumWallet, label: &str) -> AlloyProvider {
    let rpc = ClientBuilder::default()
        .layer(InstrumentationLayer::new(label))
        .http(url.clone());

    ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(rpc)
        .erased()
}
