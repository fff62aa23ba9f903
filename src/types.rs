//! Core types and data structures for the holdable ledger

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity of value in base units (18 fractional digits)
pub type Amount = u128;

/// Number of fractional digits carried by every [`Amount`]
pub const DECIMALS: u8 = 18;

/// Opaque account identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string-like identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Address {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a hold. Never reused once registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldId(String);

impl HoldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id for callers that do not bring their own
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HoldId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HoldId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle state of a hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldStatus {
    /// Funds are reserved and unavailable for ordinary transfers
    Active,
    /// The creator completed the hold as a transfer to the recipient
    Executed,
    /// The administrator released the hold without moving funds
    Removed,
}

impl HoldStatus {
    /// Executed and Removed holds can never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, HoldStatus::Active)
    }
}

impl fmt::Display for HoldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldStatus::Active => write!(f, "Active"),
            HoldStatus::Executed => write!(f, "Executed"),
            HoldStatus::Removed => write!(f, "Removed"),
        }
    }
}

/// A reservation of part of the payer's balance in favour of a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Unique identifier of the hold
    pub id: HoldId,
    /// Account whose balance is encumbered
    pub payer: Address,
    /// Beneficiary if the hold is executed
    pub recipient: Address,
    /// Only identity allowed to execute the hold
    pub creator: Address,
    /// Encumbered quantity
    pub amount: Amount,
    /// Current lifecycle state
    pub status: HoldStatus,
    /// When the hold was registered
    pub created_at: NaiveDateTime,
    /// When the hold reached a terminal state
    pub closed_at: Option<NaiveDateTime>,
}

impl Hold {
    /// Create a new active hold from a validated request
    pub fn new(request: HoldRequest) -> Self {
        Self {
            id: request.id,
            payer: request.payer,
            recipient: request.recipient,
            creator: request.creator,
            amount: request.amount,
            status: HoldStatus::Active,
            created_at: chrono::Utc::now().naive_utc(),
            closed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == HoldStatus::Active
    }

    /// Move the hold into a terminal state
    pub(crate) fn close(&mut self, status: HoldStatus) {
        self.status = status;
        self.closed_at = Some(chrono::Utc::now().naive_utc());
    }
}

/// Input for registering a hold, direct or delegated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldRequest {
    pub id: HoldId,
    pub payer: Address,
    pub recipient: Address,
    pub creator: Address,
    pub amount: Amount,
    /// Placed through an allowance, even when the spender is the payer
    #[serde(default)]
    pub delegated: bool,
}

impl HoldRequest {
    /// A hold placed by the payer on its own funds
    pub fn direct(
        id: impl Into<HoldId>,
        payer: Address,
        recipient: Address,
        amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            creator: payer.clone(),
            payer,
            recipient,
            amount,
            delegated: false,
        }
    }

    /// A hold placed by an approved spender on the payer's funds
    pub fn delegated(
        id: impl Into<HoldId>,
        spender: Address,
        payer: Address,
        recipient: Address,
        amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            payer,
            recipient,
            creator: spender,
            amount,
            delegated: true,
        }
    }

    pub fn is_delegated(&self) -> bool {
        self.delegated
    }
}

/// Descriptive token metadata. Carried, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Errors that can occur in the ledger system
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Hold id should not be empty")]
    EmptyHoldId,
    #[error("Hold id already exists: {0}")]
    DuplicateHoldId(HoldId),
    #[error("Insufficient available balance for {account}: available {available}, requested {requested}")]
    InsufficientAvailableBalance {
        account: Address,
        available: Amount,
        requested: Amount,
    },
    #[error("Amount exceeds allowance granted by {owner} to {spender}: allowance {allowance}, requested {requested}")]
    AllowanceExceeded {
        owner: Address,
        spender: Address,
        allowance: Amount,
        requested: Amount,
    },
    #[error("Hold not found: {0}")]
    HoldNotFound(HoldId),
    #[error("Hold {id} is not active (status: {status})")]
    HoldNotActive { id: HoldId, status: HoldStatus },
    #[error("Hold {id} must be executed by its creator, not {caller}")]
    NotHoldCreator { id: HoldId, caller: Address },
    #[error("Only the owner can remove holds, caller was {0}")]
    NotAdmin(Address),
    #[error("Amount must be positive")]
    ZeroAmount,
    #[error("Arithmetic overflow")]
    Overflow,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },
    #[error("Ledger has not been initialized")]
    NotInitialized,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
