//! # Holdable Ledger
//!
//! A fungible-value ledger with a hold (escrow-lock) mechanism. An account
//! can reserve part of its balance for a recipient without transferring it.
//! The reserved part still counts toward the balance but cannot be spent by
//! ordinary transfers until the hold is executed by its creator or removed
//! by the ledger owner.
//!
//! ## Features
//!
//! - **Balances and allowances**: `transfer`, `transfer_from`, `approve`
//! - **Holds**: direct (`hold`) or delegated through an allowance (`hold_from`),
//!   completed with `execute_hold` or cancelled with `remove_hold`
//! - **Serializable writes**: versioned snapshots committed with an optimistic
//!   check, retried on conflict
//! - **Storage abstraction**: backend-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use holdable_ledger::{Address, Ledger, LedgerConfig, MemoryStorage};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let owner = Address::from("owner");
//! let shop = Address::from("shop");
//! let config = LedgerConfig::new("Holdable Token", "htkn", owner.clone(), 1000);
//! let mut ledger = Ledger::create(MemoryStorage::new(), config).await.unwrap();
//!
//! ledger.hold(&owner, "order-1", &shop, 400).await.unwrap();
//! assert_eq!(ledger.held_balance_of(&owner).await.unwrap(), 400);
//! assert_eq!(ledger.available_balance_of(&owner).await.unwrap(), 600);
//! # });
//! ```

pub mod config;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use traits::*;
pub use types::*;
pub use utils::{format_units, parse_units, EnhancedHoldValidator, MemoryStorage};
