use crypto_utils::CryptoError;
use thiserror::Error;

/// Ethereum chain operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EthError {
    #[error("malformed rlp: {0}")]
    MalformedRlp(String),

    #[error("encoding overflow: {0}")]
    EncodingOverflow(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_malformed_rlp() {
        let err = EthError::MalformedRlp("truncated list".into());
        assert_eq!(err.to_string(), "malformed rlp: truncated list");
    }

    #[test]
    fn display_encoding_overflow() {
        let err = EthError::EncodingOverflow("value exceeds 256 bits".into());
        assert_eq!(err.to_string(), "encoding overflow: value exceeds 256 bits");
    }

    #[test]
    fn display_invalid_public_key() {
        let err = EthError::InvalidPublicKey("not on curve".into());
        assert_eq!(err.to_string(), "invalid public key: not on curve");
    }

    #[test]
    fn display_invalid_address() {
        let err = EthError::InvalidAddress("bad checksum".into());
        assert_eq!(err.to_string(), "invalid address: bad checksum");
    }

    #[test]
    fn display_transaction_build_error() {
        let err = EthError::TransactionBuildError("missing nonce".into());
        assert_eq!(err.to_string(), "transaction build error: missing nonce");
    }

    #[test]
    fn display_invalid_amount() {
        let err = EthError::InvalidAmount("too many decimals".into());
        assert_eq!(err.to_string(), "invalid amount: too many decimals");
    }

    #[test]
    fn display_unsupported_chain() {
        let err = EthError::UnsupportedChain(999);
        assert_eq!(err.to_string(), "unsupported chain: 999");
    }

    #[test]
    fn display_provider() {
        let err = EthError::Provider("connection refused".into());
        assert_eq!(err.to_string(), "provider error: connection refused");
    }

    #[test]
    fn crypto_errors_pass_through() {
        let err: EthError = CryptoError::VerificationFailed.into();
        assert_eq!(err.to_string(), "signature verification failed");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(EthError::InvalidAddress("test".into()));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn debug_format_works() {
        let err = EthError::UnsupportedChain(42);
        let debug = format!("{:?}", err);
        assert!(debug.contains("UnsupportedChain"));
    }
}
