use thiserror::Error;

/// Errors from big-integer, curve and signature operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid curve point: {0}")]
    InvalidPoint(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("encoding overflow: {0}")]
    EncodingOverflow(String),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
