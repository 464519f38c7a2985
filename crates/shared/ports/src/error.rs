use thiserror::Error;

/// Failures raised by a ledger gateway
///
/// Callers propagate these unchanged: nothing in Flowledger retries or
/// swallows a gateway error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Ledger rejected call: {0}")]
    Rejected(String),

    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
