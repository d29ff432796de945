//! Chaum-Pedersen batch DLEQ verification (§4.F). This is the part that
//! must be bit-exact with the issuer: SHAKE-256 feeds the hex encoding of a
//! SHA-256 seed, per-index scalars are derived by rejection sampling with a
//! curve-order-dependent top-bit mask, and the Fiat-Shamir challenge is
//! recomputed and compared in constant time.

use group::ff::PrimeField;
use multiexp::multiexp_vartime;
use sha2::{Digest, Sha256};
use sha3::{
  digest::{ExtendableOutput, Update, XofReader},
  Shake256,
};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::commitment::Commitment;
use crate::curve::{scalar_from_be_bytes, Point, Scalar};
use crate::error::{TokenError, TokenResult};

/// `{C, R}` Chaum-Pedersen response/challenge pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DleqProof {
  pub c: Scalar,
  pub r: Scalar,
}

/// P-256's group order is exactly 256 bits; `MASK[extra]` clears the top
/// `8 - extra` bits of a squeezed byte. Kept general so a future curve
/// whose order isn't a multiple of 8 bits is handled the same way (§4.F,
/// §1 — parameterized, P-256-only for now).
const MASK: [u8; 8] = [0xff, 0x01, 0x03, 0x07, 0x0f, 0x1f, 0x3f, 0x7f];
const SCALAR_BIT_LENGTH: usize = 256;

/// Verifies that `proof` attests `log_G(H) = log_{Mc}(Zc)` for the
/// composite accumulation of `(M[i], Z[i])` weighted by per-index scalars
/// derived from a seeded SHAKE-256 stream (§4.F steps 2-8).
pub fn verify_batch(proof: &DleqProof, commitment: &Commitment, m: &[Point], z: &[Point]) -> TokenResult<()> {
  if m.is_empty() || m.len() != z.len() {
    return Err(TokenError::MalformedInput("batch must be non-empty with |M| = |Z|".into()));
  }
  if commitment.g.is_identity() || commitment.h.is_identity() {
    return Err(TokenError::IdentityElement);
  }
  if m.iter().any(Point::is_identity) || z.iter().any(Point::is_identity) {
    return Err(TokenError::IdentityElement);
  }

  let seed = compute_prng_seed(commitment, m, z);
  let mut reader = Shake256::default()
    .chain(hex::encode(seed).as_bytes())
    .finalize_xof();

  let mut m_pairs = Vec::with_capacity(m.len());
  let mut z_pairs = Vec::with_capacity(z.len());
  for (mi, zi) in m.iter().zip(z.iter()) {
    let c_i = get_shake_scalar(&mut reader);
    m_pairs.push((c_i, mi.to_projective()));
    z_pairs.push((c_i, zi.to_projective()));
  }

  let mc = Point::from_affine(multiexp_vartime(&m_pairs, false).to_affine());
  let zc = Point::from_affine(multiexp_vartime(&z_pairs, false).to_affine());
  if mc.is_identity() || zc.is_identity() {
    return Err(TokenError::IdentityElement);
  }

  let a = Point::from_affine(
    (commitment.h.to_projective() * proof.c + commitment.g.to_projective() * proof.r).to_affine(),
  );
  let b = Point::from_affine((zc.to_projective() * proof.c + mc.to_projective() * proof.r).to_affine());

  let recomputed = recompute_challenge(commitment, &mc, &zc, &a, &b);
  let claimed = proof.c.to_repr();

  if bool::from(recomputed.ct_eq(claimed.as_slice())) {
    Ok(())
  } else {
    debug!(
      recomputed = %hex::encode(recomputed),
      claimed = %hex::encode(claimed),
      "DLEQ batch proof challenge mismatch"
    );
    Err(TokenError::VerificationFailed)
  }
}

fn compute_prng_seed(commitment: &Commitment, m: &[Point], z: &[Point]) -> [u8; 32] {
  let mut hasher = Sha256::new();
  hasher.update(commitment.g.sec1_encode());
  hasher.update(commitment.h.sec1_encode());
  for (mi, zi) in m.iter().zip(z.iter()) {
    hasher.update(mi.sec1_encode());
    hasher.update(zi.sec1_encode());
  }
  hasher.finalize().into()
}

fn recompute_challenge(commitment: &Commitment, mc: &Point, zc: &Point, a: &Point, b: &Point) -> [u8; 32] {
  let mut hasher = Sha256::new();
  hasher.update(commitment.g.sec1_encode());
  hasher.update(commitment.h.sec1_encode());
  hasher.update(mc.sec1_encode());
  hasher.update(zc.sec1_encode());
  hasher.update(a.sec1_encode());
  hasher.update(b.sec1_encode());
  hasher.finalize().into()
}

/// `GetShakeScalar`: squeeze 32 bytes, mask the top bits per the curve's
/// order bit length, reject and re-squeeze if the result is `>= r`.
fn get_shake_scalar(reader: &mut impl XofReader) -> Scalar {
  let extra = SCALAR_BIT_LENGTH % 8;
  let mask = MASK[extra];
  loop {
    let mut buf = [0u8; 32];
    reader.read(&mut buf);
    buf[0] &= mask;
    if let Some(scalar) = scalar_from_be_bytes(&buf) {
      return scalar;
    }
  }
}
