//! Ledger module containing balances, holds, access control and the orchestrator

pub mod access;
pub mod account;
pub mod core;
pub mod hold;
pub mod state;

pub use access::*;
pub use account::*;
pub use self::core::*;
pub use hold::*;
pub use state::*;
