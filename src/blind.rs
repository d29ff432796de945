//! Blinding layer (§4.D). `Blind` hides a token's curve image behind a fresh
//! scalar for issuance; `Unblind` removes it from the signed point the
//! issuer returns.

use group::ff::Field;
use rand_core::OsRng;

use crate::curve::{invert_scalar, Point, Scalar};
use crate::error::{TokenError, TokenResult};

/// A fresh blinding scalar. Overwritten with zero on drop; `Debug` is
/// redacted (§7).
pub struct BlindingFactor(Scalar);

impl Drop for BlindingFactor {
  fn drop(&mut self) {
    self.0 = Scalar::ZERO;
  }
}

impl std::fmt::Debug for BlindingFactor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("BlindingFactor(REDACTED)")
  }
}

impl BlindingFactor {
  pub fn as_scalar(&self) -> &Scalar {
    &self.0
  }
}

/// `Blind(P) -> (bP, b)`.
pub struct BlindedToken {
  pub point: Point,
  pub factor: BlindingFactor,
}

pub fn blind(point: &Point) -> BlindedToken {
  let b = Scalar::random(&mut OsRng);
  BlindedToken { point: point.scalar_mul(&b), factor: BlindingFactor(b) }
}

/// `Unblind(b, Q) -> b^-1 . Q`. Fails with `InvalidScalar` if `b = 0`.
pub fn unblind(factor: &BlindingFactor, signed: &Point) -> TokenResult<Point> {
  if bool::from(factor.0.is_zero()) {
    return Err(TokenError::InvalidScalar);
  }
  let inverse = invert_scalar(&factor.0)?;
  Ok(signed.scalar_mul(&inverse))
}
