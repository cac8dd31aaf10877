//! The builder capability shared by every chain and transaction type.

use crate::transaction::BaseTransaction;
use crate::BuilderError;

/// Fluent, fail-fast accumulation of transaction fields and signers.
///
/// Setters validate eagerly and return the builder for chaining. `build()`
/// may be called repeatedly: each call applies the signers queued so far and
/// returns a transaction reflecting the net, de-duplicated signer set.
///
/// Lifecycle: `Empty -> Configuring -> Validated -> Built`, where more
/// setters and signers may follow any `build()`.
pub trait TransactionBuilder {
    /// Chain-specific fee settings.
    type Fee;
    /// Key material accepted by `sign` and `signature`.
    type KeyPair;
    /// The transaction produced by `build`.
    type Transaction: BaseTransaction;

    /// Set gas/fee parameters.
    fn fee(&mut self, fee: Self::Fee) -> Result<&mut Self, BuilderError>;

    /// Set the sending (fee-paying) account.
    fn source(&mut self, address: &str) -> Result<&mut Self, BuilderError>;

    /// Queue a signature by a local private key.
    ///
    /// Signing twice with the same key is a no-op; a new signer beyond the
    /// chain's cap fails with `Signing`.
    fn sign(&mut self, key: &Self::KeyPair) -> Result<&mut Self, BuilderError>;

    /// Queue an externally produced signature by the given key.
    fn signature(&mut self, signature: &str, key: &Self::KeyPair) -> Result<&mut Self, BuilderError>;

    /// Check that every mandatory field is set.
    ///
    /// Fails with `BuildTransaction` naming the first missing field in the
    /// order fee, source, destination/validator, amount.
    fn validate_mandatory_fields(&self) -> Result<(), BuilderError>;

    /// Check that a serialized transaction can be decoded by this builder.
    fn validate_raw_transaction(&self, raw: &str) -> Result<(), BuilderError>;

    /// Validate, assemble, sign and return the transaction.
    fn build(&mut self) -> Result<Self::Transaction, BuilderError>;

    /// Rehydrate builder state from a serialized transaction.
    fn from_raw(&mut self, raw: &str) -> Result<&mut Self, BuilderError>;
}
