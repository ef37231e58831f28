//! Construction of the local signers used to send transactions.

use {
    alloy::signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English},
    anyhow::{Context, Result},
};

/// Mnemonic of the prefunded accounts of local development nodes (Hardhat,
/// Anvil).
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Derives the signer at `index` of the default BIP-44 Ethereum derivation
/// path of `phrase`.
pub fn mnemonic_signer(phrase: &str, index: u32) -> Result<PrivateKeySigner> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .index(index)
        .with_context(|| format!("invalid derivation index {index}"))?
        .build()
        .context("could not derive signer from mnemonic")
}

/// Parses a hex encoded private key, with or without `0x` prefix.
pub fn private_key_signer(key: &str) -> Result<PrivateKeySigner> {
    key.trim().parse().context("invalid private key")
}
