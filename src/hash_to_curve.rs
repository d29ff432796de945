//! Try-and-increment hash-to-curve (§4.B). Bit-exact with the issuer: the
//! separator is fed once per attempt alongside the running seed and a
//! little-endian attempt counter, not folded into a persistent hash context.

use sha2::{Digest, Sha256};

use crate::curve::{decompress_point, FieldBytes, Point};

const SEED_SEPARATOR: &[u8] = b"1.2.840.100045.3.1.7 point generation seed";
const MAX_ATTEMPTS: u32 = 10;

/// Maps a 256-bit seed to a curve point by try-and-increment. Returns `None`
/// if no attempt in `0..MAX_ATTEMPTS` lifts to the curve; `NewToken` is the
/// layer responsible for retrying with fresh randomness (§4.C, §9).
pub fn hash_to_curve(seed: &[u8; 32]) -> Option<Point> {
  let mut current = *seed;
  for attempt in 0..MAX_ATTEMPTS {
    let mut hasher = Sha256::new();
    hasher.update(SEED_SEPARATOR);
    hasher.update(current);
    hasher.update(attempt.to_le_bytes());
    let digest: [u8; 32] = hasher.finalize().into();

    let x = FieldBytes::clone_from_slice(&digest);
    if let Some(point) = decompress_point(&x, 0x02) {
      return Some(point);
    }
    if let Some(point) = decompress_point(&x, 0x03) {
      return Some(point);
    }
    current = digest;
  }
  None
}
