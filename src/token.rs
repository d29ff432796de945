//! Token generation (§4.C). A token is 32 CSPRNG bytes whose curve image is
//! produced by hash-to-curve; generation retries on the (astronomically
//! rare) try-and-increment exhaustion rather than surfacing it to the
//! caller.

use rand_core::{OsRng, RngCore};
use zeroize::Zeroize;

use crate::curve::Point;
use crate::hash_to_curve::hash_to_curve;

/// 32 random bytes backing one token. Zeroized on drop; its `Debug` impl is
/// redacted so a stray `{:?}` in a log line can never leak it (§7).
pub struct Token([u8; 32]);

impl Token {
  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }
}

impl Drop for Token {
  fn drop(&mut self) {
    self.0.zeroize();
  }
}

impl std::fmt::Debug for Token {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Token(REDACTED)")
  }
}

/// `NewToken() -> (tokenBytes, T)`. Draws fresh CSPRNG bytes until
/// hash-to-curve succeeds.
pub fn new_token() -> (Token, Point) {
  loop {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    if let Some(point) = hash_to_curve(&bytes) {
      return (Token(bytes), point);
    }
  }
}
