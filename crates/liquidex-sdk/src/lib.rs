pub use lwk_wollet::elements;

pub mod builder;
pub mod chain;
pub mod codec;
pub mod coin_select;
pub mod error;
pub mod fee;
pub mod funding;
pub mod holder;
pub mod network;
pub mod pset;
pub mod registry;
pub mod signer;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Core types
pub use chain::{ChainBackend, ElectrumBackend};
pub use error::{Error, Result};
pub use network::Network;
pub use pset::{Utxo, decode_pset, encode_pset};

// Re-export LWK for app-layer use
pub use lwk_wollet;

// Codecs
pub use codec::{
    ASSET_TAG_LEN, CONFIDENTIAL_VALUE_LEN, MAX_MONEY, decode_asset, decode_value, encode_asset,
    encode_value,
};

// Selection and fees
pub use coin_select::{Selection, select};
pub use fee::{FeeQuote, FeeRate, estimate, estimate_fee, estimate_vsize};

// Building and signing
pub use builder::{FeeLegResult, SwapLegResult, TxBuilder, create_empty};
pub use holder::HolderIdentity;
pub use signer::{InputSigner, finalize_and_extract, sign, to_hex};

// Market registry and funding
pub use funding::{funding_update, market_addresses, record_funding};
pub use registry::{MarketRecord, MarketRegistry, MarketUpdate};
