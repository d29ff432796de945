//! Batch-proof blob framing (§4.F parse step, §6): base64-in-JSON nested two
//! levels deep, with an optional `batch-proof=` prefix on the outer text.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use crate::curve::scalar_from_be_bytes;
use crate::dleq::DleqProof;
use crate::error::{TokenError, TokenResult};

const BATCH_PROOF_PREFIX: &str = "batch-proof=";

#[derive(Deserialize)]
struct OuterEnvelope {
  #[serde(rename = "P")]
  p: String,
}

#[derive(Deserialize)]
struct InnerProof {
  #[serde(rename = "R")]
  r: String,
  #[serde(rename = "C")]
  c: String,
}

/// Decodes a batch-proof blob as received in the issuance response into a
/// `DleqProof`. The blob is base64 text, optionally prefixed with
/// `batch-proof=`, wrapping a JSON object `{"P": "<base64>"}` whose decoded
/// payload is itself JSON `{"R": "<base64>", "C": "<base64>"}` of
/// big-endian scalars.
pub fn decode_batch_proof(blob: &[u8]) -> TokenResult<DleqProof> {
  let outer_bytes = STANDARD
    .decode(blob)
    .map_err(|e| TokenError::MalformedInput(format!("invalid outer base64: {e}")))?;
  let outer_text = std::str::from_utf8(&outer_bytes)
    .map_err(|e| TokenError::MalformedInput(format!("outer blob is not UTF-8: {e}")))?;
  let stripped = outer_text.strip_prefix(BATCH_PROOF_PREFIX).unwrap_or(outer_text);

  let envelope: OuterEnvelope = serde_json::from_str(stripped)
    .map_err(|e| TokenError::MalformedInput(format!("invalid outer proof JSON: {e}")))?;

  let inner_bytes = STANDARD
    .decode(envelope.p)
    .map_err(|e| TokenError::MalformedInput(format!("invalid inner base64: {e}")))?;
  let inner: InnerProof = serde_json::from_slice(&inner_bytes)
    .map_err(|e| TokenError::MalformedInput(format!("invalid inner proof JSON: {e}")))?;

  let r_bytes = STANDARD
    .decode(inner.r)
    .map_err(|e| TokenError::MalformedInput(format!("invalid R base64: {e}")))?;
  let c_bytes = STANDARD
    .decode(inner.c)
    .map_err(|e| TokenError::MalformedInput(format!("invalid C base64: {e}")))?;

  let r = scalar_from_be_bytes(&r_bytes).ok_or(TokenError::InvalidScalar)?;
  let c = scalar_from_be_bytes(&c_bytes).ok_or(TokenError::InvalidScalar)?;

  Ok(DleqProof { c, r })
}
