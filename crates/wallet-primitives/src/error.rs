/// Failures raised while parsing or using key material and encodings.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid extended key: {0}")]
    InvalidExtendedKey(String),

    /// Base58Check checksum did not match the payload.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    /// A reader ran out of input.
    #[error("unexpected end of data")]
    UnexpectedEof,
}
