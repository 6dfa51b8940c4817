/// A market as persisted by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRecord {
    /// Deposit address of the market wallet; unique per market.
    pub address: String,
    pub base_asset: Option<String>,
    pub quote_asset: Option<String>,
    pub base_funding_tx: Option<String>,
    pub quote_funding_tx: Option<String>,
    /// Market fee in basis points.
    pub fee: u32,
    pub tradable: bool,
    /// SQL `datetime` text, e.g. `2025-01-01 12:00:00`.
    pub created_at: String,
}

/// Fields written once a market wallet is seen funded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketUpdate {
    pub base_asset: String,
    pub quote_asset: String,
    pub base_funding_tx: String,
    pub quote_funding_tx: String,
    pub fee: u32,
    pub tradable: bool,
}

/// Store operations needed by the funding watcher and the operator service.
///
/// `liquidex-store` implements this for `MarketStore`, which keeps the SDK
/// free of a database dependency.
pub trait MarketRegistry: Send + 'static {
    /// Register a market for `address`. Registering an existing address is a no-op.
    fn create_market(&mut self, address: &str) -> Result<(), String>;

    /// All markets, oldest first.
    fn find_markets_sorted_by_timestamp(&mut self) -> Result<Vec<MarketRecord>, String>;

    /// Apply `update` to the market at `address`. Returns `false` if no
    /// such market exists.
    fn update_by_address(&mut self, address: &str, update: &MarketUpdate) -> Result<bool, String>;
}
