//! Client-side cryptographic core for a Privacy-Pass-style anonymous token
//! scheme: 2HashDH VOPRF over NIST P-256 with batched Chaum-Pedersen DLEQ
//! verification.
//!
//! The browser/extension UI, persistence, the HTTPS fetch of the commitment
//! file, and redemption HTTP wrapping are external collaborators; this crate
//! only implements the cryptographic core (§1).

pub mod blind;
pub mod commitment;
pub mod curve;
pub mod dleq;
pub mod error;
pub mod hash_to_curve;
pub mod keys;
pub mod token;
pub mod wire;

pub use blind::{blind, unblind, BlindedToken, BlindingFactor};
pub use commitment::{Commitment, CommitmentEnvironment, CommitmentFile, CommitmentSource, CommitmentStore};
pub use curve::{Point, Scalar};
pub use dleq::{verify_batch, DleqProof};
pub use error::{TokenError, TokenResult};
pub use hash_to_curve::hash_to_curve;
pub use keys::{check_request_binding, derive_key, request_binding};
pub use token::{new_token, Token};
pub use wire::decode_batch_proof;

#[cfg(test)]
mod integration_test {
  use super::*;
  use group::ff::{Field, PrimeField};
  use rand_core::OsRng;
  use sha2::{Digest, Sha256};
  use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
  };

  /// Mirrors the verifier's transcript exactly; there is no issuer in this
  /// repository, so the integration test plays both roles.
  fn reference_prove(k: &Scalar, commitment: &Commitment, m: &[Point], z: &[Point]) -> DleqProof {
    let mut hasher = Sha256::new();
    hasher.update(commitment.g.sec1_encode());
    hasher.update(commitment.h.sec1_encode());
    for (mi, zi) in m.iter().zip(z.iter()) {
      hasher.update(mi.sec1_encode());
      hasher.update(zi.sec1_encode());
    }
    let seed: [u8; 32] = hasher.finalize().into();

    let mut reader = Shake256::default().chain(hex::encode(seed).as_bytes()).finalize_xof();
    let mut m_pairs = Vec::with_capacity(m.len());
    let mut z_pairs = Vec::with_capacity(z.len());
    for (mi, zi) in m.iter().zip(z.iter()) {
      let c_i = loop {
        let mut buf = [0u8; 32];
        reader.read(&mut buf);
        if let Some(scalar) = curve::scalar_from_be_bytes(&buf) {
          break scalar;
        }
      };
      m_pairs.push((c_i, mi.to_projective()));
      z_pairs.push((c_i, zi.to_projective()));
    }
    let mc = Point::from_affine(multiexp::multiexp_vartime(&m_pairs, false).to_affine());
    let zc = Point::from_affine(multiexp::multiexp_vartime(&z_pairs, false).to_affine());

    loop {
      let t = Scalar::random(&mut OsRng);
      let a = Point::from_affine((commitment.g.to_projective() * t).to_affine());
      let b = Point::from_affine((mc.to_projective() * t).to_affine());
      let mut challenge_hasher = Sha256::new();
      challenge_hasher.update(commitment.g.sec1_encode());
      challenge_hasher.update(commitment.h.sec1_encode());
      challenge_hasher.update(mc.sec1_encode());
      challenge_hasher.update(zc.sec1_encode());
      challenge_hasher.update(a.sec1_encode());
      challenge_hasher.update(b.sec1_encode());
      let digest: [u8; 32] = challenge_hasher.finalize().into();
      if let Some(c) = curve::scalar_from_be_bytes(&digest) {
        let r = t - c * k;
        return DleqProof { c, r };
      }
    }
  }

  /// Generate -> blind -> (reference-prove, standing in for issuance) ->
  /// verify -> unblind -> derive-key -> bind, end to end.
  #[test]
  fn full_issuance_and_redemption_round_trip() {
    let k = Scalar::from(0xABCDu64);
    let commitment = Commitment { g: Point::generator(), h: Point::generator().scalar_mul(&k) };

    let (token, t) = new_token();
    let blinded = blind(&t);

    let signed = blinded.point.scalar_mul(&k);
    let proof = reference_prove(&k, &commitment, &[blinded.point], &[signed]);

    verify_batch(&proof, &commitment, &[blinded.point], &[signed]).expect("proof must verify");

    let n = unblind(&blinded.factor, &signed).expect("unblind must succeed");
    assert_eq!(n, t.scalar_mul(&k));

    let key = derive_key(&n, token.as_bytes());
    let data: &[&[u8]] = &[b"method=POST", b"path=/redeem"];
    let mac = request_binding(&key, data);
    assert!(check_request_binding(&key, data, &mac));
    assert!(!check_request_binding(&key, &[b"method=GET"], &mac));
  }

  #[test]
  fn commitment_store_feeds_verifier_snapshot() {
    let k = Scalar::from(42u64);
    let store = CommitmentStore::new();
    store.publish(Commitment { g: Point::generator(), h: Point::generator().scalar_mul(&k) });
    let commitment = store.snapshot().expect("published snapshot");

    let (_, t) = new_token();
    let blinded = blind(&t);
    let signed = blinded.point.scalar_mul(&k);
    let proof = reference_prove(&k, &commitment, &[blinded.point], &[signed]);
    assert!(verify_batch(&proof, &commitment, &[blinded.point], &[signed]).is_ok());
  }

  #[test]
  fn batch_proof_wire_round_trip_feeds_verifier() {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let k = Scalar::from(13u64);
    let commitment = Commitment { g: Point::generator(), h: Point::generator().scalar_mul(&k) };
    let (_, t) = new_token();
    let blinded = blind(&t);
    let signed = blinded.point.scalar_mul(&k);
    let proof = reference_prove(&k, &commitment, &[blinded.point], &[signed]);

    let inner = format!(
      r#"{{"R":"{}","C":"{}"}}"#,
      STANDARD.encode(proof.r.to_repr()),
      STANDARD.encode(proof.c.to_repr())
    );
    let outer = format!(r#"{{"P":"{}"}}"#, STANDARD.encode(inner));
    let blob = STANDARD.encode(format!("batch-proof={outer}")).into_bytes();

    let decoded = decode_batch_proof(&blob).unwrap();
    assert!(verify_batch(&decoded, &commitment, &[blinded.point], &[signed]).is_ok());
  }
}
