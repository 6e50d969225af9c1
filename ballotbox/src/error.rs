use thiserror::Error;

/// Fatal configuration errors, detected once at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ballotbox config: {0} is not set")]
    MissingVar(&'static str),

    #[error("ballotbox config: encryption key must be exactly 64 hex characters (32 bytes)")]
    KeyLength,

    #[error("ballotbox config: encryption key is not valid hex: {0}")]
    KeyHex(#[from] hex::FromHexError),
}

/// Storage-layer errors.
///
/// Duplicate keys are a typed variant carrying the violated index name, so
/// callers never have to string-match on error messages to detect them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ballotbox store: duplicate key on unique index ({0})")]
    DuplicateKey(&'static str),

    #[error("ballotbox store: no such {0}")]
    MissingRow(&'static str),

    #[error("ballotbox store: timed out waiting for the store lock")]
    LockTimeout,

    #[error("ballotbox store: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ballotbox store: bad journal record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors surfaced to the caller of the ballot lifecycle.
#[derive(Debug, Error)]
pub enum Error {
    #[error("ballotbox: election is closed or does not exist")]
    ElectionClosedOrMissing,

    #[error("ballotbox: candidate is not part of this election")]
    InvalidCandidate,

    #[error("ballotbox: this voter has already cast a ballot in this election")]
    AlreadyVoted,

    #[error("ballotbox: ballot failed authentication - ciphertext, nonce or tag is corrupted")]
    AuthenticationFailure,

    #[error("ballotbox: receipt not found")]
    ReceiptNotFound,

    #[error("ballotbox: transient storage failure, the call may be retried: {0}")]
    Transient(StoreError),

    #[error("ballotbox: storage failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            // A retried cast is safe: the uniqueness constraint turns a
            // retry-after-unacknowledged-persist into `AlreadyVoted`.
            StoreError::LockTimeout => Error::Transient(err),
            _ => Error::Store(err),
        }
    }
}
