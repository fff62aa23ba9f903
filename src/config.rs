//! Construction-time configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::*;
use crate::utils::units;

/// Commit attempts made before a write gives up on version conflicts
pub const DEFAULT_MAX_COMMIT_RETRIES: u32 = 16;

/// Inputs needed to create a ledger.
///
/// ```json
/// {
///   "name": "Holdable Token",
///   "symbol": "htkn",
///   "owner": "0xadmin",
///   "initial_supply": 1000000000000000000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Human-readable token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Administrative principal; receives the whole initial supply
    pub owner: Address,
    /// Initial supply in base units
    #[serde(default)]
    pub initial_supply: Amount,
    #[serde(default = "default_max_commit_retries")]
    pub max_commit_retries: u32,
}

fn default_max_commit_retries() -> u32 {
    DEFAULT_MAX_COMMIT_RETRIES
}

impl LedgerConfig {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        owner: Address,
        initial_supply: Amount,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            owner,
            initial_supply,
            max_commit_retries: DEFAULT_MAX_COMMIT_RETRIES,
        }
    }

    /// Set the initial supply from a decimal token amount such as `"1000"` or `"0.5"`
    pub fn with_initial_supply_tokens(mut self, tokens: &str) -> LedgerResult<Self> {
        self.initial_supply = units::parse_units(tokens)?;
        Ok(self)
    }

    pub fn with_max_commit_retries(mut self, retries: u32) -> Self {
        self.max_commit_retries = retries;
        self
    }

    pub fn from_json_str(json: &str) -> LedgerResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::Config("Token name cannot be empty".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(LedgerError::Config(
                "Token symbol cannot be empty".to_string(),
            ));
        }
        if self.owner.is_empty() {
            return Err(LedgerError::Config(
                "Owner address cannot be empty".to_string(),
            ));
        }
        if self.max_commit_retries == 0 {
            return Err(LedgerError::Config(
                "max_commit_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
