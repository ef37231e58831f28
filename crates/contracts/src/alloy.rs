// Generate the main bindings in a private module. That allows us to re-export
// all items in our own module while also adding some items ourselves.
#[allow(non_snake_case)]
mod GoodMorningPrivate {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        contract GoodMorning {
            function mintGMKit() external;
        }
    );
}

#[allow(non_snake_case)]
pub mod GoodMorning {
    use alloy::providers::DynProvider;

    pub use super::GoodMorningPrivate::*;
    pub type Instance = GoodMorning::GoodMorningInstance<DynProvider>;

    /// Name under which the compiled artifact is stored.
    pub const NAME: &str = "GoodMorning";
    /// The minting function called after deployment.
    pub const MINT_GM_KIT: &str = "mintGMKit";
}
