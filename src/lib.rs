pub mod config;
pub mod error;
pub mod service;
pub mod watcher;

pub use config::{DaemonConfig, identity_from_env};
pub use error::{DaemonError, Result};
pub use service::{
    DepositAddressReply, DepositAddressRequest, FeeDepositAddressReply, FeeDepositAddressRequest,
    OperatorService,
};
pub use watcher::FundingWatcher;
