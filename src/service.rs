//! Operator request/reply surface.
//!
//! Requests and replies travel as JSON; the transport around them is left to
//! the embedding process.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use liquidex_sdk::{HolderIdentity, MarketRegistry, market_addresses};

use crate::error::{DaemonError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAddressRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAddressReply {
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDepositAddressRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDepositAddressReply {
    pub address: String,
}

pub const DEPOSIT_ADDRESS: &str = "DepositAddress";
pub const FEE_DEPOSIT_ADDRESS: &str = "FeeDepositAddress";

/// Answers operator requests with the market and fee identities.
pub struct OperatorService<R: MarketRegistry> {
    market: HolderIdentity,
    fee: HolderIdentity,
    registry: Arc<Mutex<R>>,
}

impl<R: MarketRegistry> OperatorService<R> {
    pub fn new(market: HolderIdentity, fee: HolderIdentity, registry: Arc<Mutex<R>>) -> Self {
        Self {
            market,
            fee,
            registry,
        }
    }

    /// Address the operator funds a new market through. The market is
    /// registered on first request so the funding watcher picks it up.
    pub fn deposit_address(&self, _req: DepositAddressRequest) -> Result<DepositAddressReply> {
        let address = self.market.address();
        self.registry
            .lock()
            .map_err(|_| DaemonError::Registry("failed to lock registry".into()))?
            .create_market(&address)
            .map_err(DaemonError::Registry)?;
        log::debug!("handed out deposit address {address}");
        Ok(DepositAddressReply { address })
    }

    /// Address the operator tops up to pay network fees.
    pub fn fee_deposit_address(
        &self,
        _req: FeeDepositAddressRequest,
    ) -> Result<FeeDepositAddressReply> {
        Ok(FeeDepositAddressReply {
            address: self.fee.address(),
        })
    }

    /// Deposit addresses of every registered market, oldest first.
    pub fn market_addresses(&self) -> Result<Vec<String>> {
        let mut registry = self
            .registry
            .lock()
            .map_err(|_| DaemonError::Registry("failed to lock registry".into()))?;
        Ok(market_addresses(&mut *registry))
    }

    /// Dispatch a JSON-encoded request by method name.
    pub fn handle(&self, method: &str, body: &str) -> Result<String> {
        let body = if body.trim().is_empty() { "{}" } else { body };
        match method {
            DEPOSIT_ADDRESS => {
                let reply = self.deposit_address(serde_json::from_str(body)?)?;
                Ok(serde_json::to_string(&reply)?)
            }
            FEE_DEPOSIT_ADDRESS => {
                let reply = self.fee_deposit_address(serde_json::from_str(body)?)?;
                Ok(serde_json::to_string(&reply)?)
            }
            other => Err(DaemonError::UnknownMethod(other.to_string())),
        }
    }
}
