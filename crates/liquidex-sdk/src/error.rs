use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("malformed asset: {0}")]
    MalformedAsset(String),

    #[error("malformed confidential value: {0}")]
    MalformedValue(String),

    #[error("value {0} is outside the representable money range")]
    ValueOutOfRange(u64),

    #[error("{0}: no utxos available")]
    NoCandidates(&'static str),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("invalid fee rate: {0}")]
    InvalidFeeRate(String),

    #[error("invalid signature on input {0}")]
    InvalidSignature(usize),

    #[error("invalid keypair: {0}")]
    InvalidKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("electrum error: {0}")]
    Electrum(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("broadcast error: {0}")]
    Broadcast(String),

    #[error("market registry error: {0}")]
    Registry(String),
}

pub type Result<T> = std::result::Result<T, Error>;
