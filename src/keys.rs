//! Key derivation and request binding (§4.E). Both are HMAC-SHA256 with a
//! fixed label as the first transcript update.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::curve::Point;

type HmacSha256 = Hmac<Sha256>;

const DERIVE_KEY_LABEL: &[u8] = b"hash_derive_key";
const REQUEST_BINDING_LABEL: &[u8] = b"hash_request_binding";

fn finalize(mac: HmacSha256) -> [u8; 32] {
  let tag = mac.finalize().into_bytes();
  let mut out = [0u8; 32];
  out.copy_from_slice(tag.as_slice());
  out
}

/// `DeriveKey(N, token) -> key`.
///
/// The HMAC key is the literal bytes of the label `hash_derive_key`, and
/// that same byte sequence is *also* the first transcript update before
/// `token` and `Sec1Encode(N)` — this looks like a bug but is a deliberate
/// bit-exact match with the issuance server (§4.E, §9); do not "fix" it.
pub fn derive_key(signed_point: &Point, token: &[u8]) -> [u8; 32] {
  let mut mac = HmacSha256::new_from_slice(DERIVE_KEY_LABEL).expect("HMAC accepts any key length");
  mac.update(DERIVE_KEY_LABEL);
  mac.update(token);
  mac.update(&signed_point.sec1_encode());
  finalize(mac)
}

/// `RequestBinding(key, data) -> mac`.
pub fn request_binding(key: &[u8], data: &[&[u8]]) -> [u8; 32] {
  let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
  mac.update(REQUEST_BINDING_LABEL);
  for item in data {
    mac.update(item);
  }
  finalize(mac)
}

/// Recomputes the request-binding MAC and compares it against `tag` in
/// constant time.
pub fn check_request_binding(key: &[u8], data: &[&[u8]], tag: &[u8; 32]) -> bool {
  let expected = request_binding(key, data);
  bool::from(expected.ct_eq(tag))
}
