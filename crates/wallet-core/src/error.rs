use wallet_primitives::PrimitivesError;

/// Error taxonomy shared by every transaction builder.
///
/// Messages are carried verbatim so callers and tests see the exact text the
/// builder produced (e.g. `Invalid transaction: missing fee`).
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    /// A setter received a malformed address, amount, key or identifier.
    #[error("{0}")]
    InvalidParameterValue(String),
    /// A mandatory field is missing or inconsistent at `build()` time.
    #[error("{0}")]
    BuildTransaction(String),
    /// A signature could not be produced or accepted (e.g. signer cap exceeded).
    #[error("{0}")]
    Signing(String),
    /// A serialized transaction could not be decoded.
    #[error("{0}")]
    Parse(String),
    /// A key or address uses an encoding other than the one expected.
    #[error("{0}")]
    UnexpectedAddress(String),
    /// A collaborator service (account lookup, broadcast) failed.
    #[error("service error: {0}")]
    Service(String),
    /// An underlying primitives error (forwarded from `wallet-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] PrimitivesError),
}
