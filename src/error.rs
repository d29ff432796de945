use thiserror::Error;

/// Failure taxonomy for the token core.
///
/// Every fallible operation in this crate returns one of these instead of
/// panicking. Cryptographic comparisons that feed into `VerificationFailed`
/// are done in constant time before this error is ever constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
  #[error("malformed input: {0}")]
  MalformedInput(String),

  #[error("scalar is out of range or zero where an inverse is required")]
  InvalidScalar,

  #[error("point does not satisfy the curve equation")]
  OffCurve,

  #[error("DLEQ batch proof verification failed")]
  VerificationFailed,

  #[error("commitment snapshot is unavailable")]
  Unavailable,

  #[error("expected SEC1 uncompressed tag 0x04")]
  TagError,

  #[error("identity element encountered where a non-identity point is required")]
  IdentityElement,
}

pub type TokenResult<T> = Result<T, TokenError>;
