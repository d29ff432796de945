//! Commitment snapshot contract (§4.G, §5, §6). The commitment pair `(G, H)`
//! is the only process-wide mutable state this crate carries: writers publish
//! a new snapshot atomically, and a verification in progress keeps using the
//! snapshot it read for its whole duration even if the store is swapped
//! underneath it.

use std::sync::{Arc, RwLock};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tracing::debug;

use crate::curve::Point;
use crate::error::{TokenError, TokenResult};

/// A `(G, H)` pair with `H = k*G` for the issuer's secret `k`. `G` is
/// expected to be the curve generator or another publicly agreed base point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment {
  pub g: Point,
  pub h: Point,
}

impl Commitment {
  pub fn from_base64(g_b64: &str, h_b64: &str) -> TokenResult<Self> {
    let g = decode_point(g_b64)?;
    let h = decode_point(h_b64)?;
    Ok(Self { g, h })
  }
}

fn decode_point(b64: &str) -> TokenResult<Point> {
  let bytes = STANDARD
    .decode(b64)
    .map_err(|e| TokenError::MalformedInput(format!("invalid base64 commitment point: {e}")))?;
  Point::sec1_decode(&bytes)
}

/// Selects which entry of the commitment file to load (§6, §2.1-K). Chosen
/// once at construction, not renegotiated mid-process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitmentEnvironment {
  Production,
  Dev,
}

impl CommitmentEnvironment {
  fn key(self) -> &'static str {
    match self {
      Self::Production => "1.0",
      Self::Dev => "dev",
    }
  }
}

/// One `(G, H)` entry of the commitment file, still base64-encoded.
#[derive(Clone, Debug, Deserialize)]
struct CommitmentEntry {
  #[serde(rename = "G")]
  g: String,
  #[serde(rename = "H")]
  h: String,
}

/// The commitment file's outer JSON shape (§6): a single top-level key whose
/// value maps environment selectors (`"1.0"`, `"dev"`) to `CommitmentEntry`.
#[derive(Clone, Debug, Deserialize)]
pub struct CommitmentFile(std::collections::HashMap<String, std::collections::HashMap<String, CommitmentEntry>>);

impl CommitmentFile {
  pub fn from_json(bytes: &[u8]) -> TokenResult<Self> {
    serde_json::from_slice(bytes)
      .map_err(|e| TokenError::MalformedInput(format!("invalid commitment file JSON: {e}")))
  }

  /// Resolves the named environment from whichever top-level key is present,
  /// and decodes its `(G, H)` pair into curve points.
  pub fn resolve(&self, env: CommitmentEnvironment) -> TokenResult<Commitment> {
    let entry = self
      .0
      .values()
      .find_map(|by_env| by_env.get(env.key()))
      .ok_or(TokenError::Unavailable)?;
    Commitment::from_base64(&entry.g, &entry.h)
  }
}

/// Process-wide commitment snapshot. Readers get an `Arc<Commitment>` that
/// stays stable for as long as they hold it, even if `publish` swaps in a
/// new pair concurrently (§5).
#[derive(Default)]
pub struct CommitmentStore(RwLock<Option<Arc<Commitment>>>);

impl CommitmentStore {
  pub fn new() -> Self {
    Self(RwLock::new(None))
  }

  /// Atomically publishes a new commitment snapshot.
  pub fn publish(&self, commitment: Commitment) {
    let mut guard = self.0.write().expect("commitment store lock poisoned");
    *guard = Some(Arc::new(commitment));
    debug!(g = %hex::encode(commitment.g.sec1_encode()), h = %hex::encode(commitment.h.sec1_encode()), "published commitment snapshot");
  }

  /// Reads a stable snapshot of the current commitment pair. Fails with
  /// `Unavailable` if none has been published yet.
  pub fn snapshot(&self) -> TokenResult<Arc<Commitment>> {
    let snapshot = self.0.read().expect("commitment store lock poisoned").clone();
    match snapshot {
      Some(commitment) => Ok(commitment),
      None => {
        debug!("commitment snapshot requested before any publish");
        Err(TokenError::Unavailable)
      }
    }
  }
}

/// Narrow trait at the external loader boundary (§4.G): fetching the
/// commitment file bytes (HTTPS) is out of scope for this crate, but loading
/// a fetched-and-parsed `CommitmentFile` into a `CommitmentStore` is not.
pub trait CommitmentSource {
  fn load(&self, env: CommitmentEnvironment) -> TokenResult<Commitment>;
}

impl CommitmentSource for CommitmentFile {
  fn load(&self, env: CommitmentEnvironment) -> TokenResult<Commitment> {
    self.resolve(env)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_file_json() -> Vec<u8> {
    let g = Point::generator();
    let h = g.scalar_mul(&crate::curve::Scalar::from(7u64));
    let g_b64 = STANDARD.encode(g.sec1_encode());
    let h_b64 = STANDARD.encode(h.sec1_encode());
    format!(
      r#"{{"CommitmentsData":{{"1.0":{{"G":"{g_b64}","H":"{h_b64}"}},"dev":{{"G":"{g_b64}","H":"{g_b64}"}}}}}}"#
    )
    .into_bytes()
  }

  #[test]
  fn resolves_production_entry() {
    let file = CommitmentFile::from_json(&sample_file_json()).unwrap();
    let commitment = file.resolve(CommitmentEnvironment::Production).unwrap();
    assert_eq!(commitment.g, Point::generator());
  }

  #[test]
  fn resolves_dev_entry_independently() {
    let file = CommitmentFile::from_json(&sample_file_json()).unwrap();
    let dev = file.resolve(CommitmentEnvironment::Dev).unwrap();
    assert_eq!(dev.g, dev.h);
  }

  #[test]
  fn missing_environment_is_unavailable() {
    let json = br#"{"CommitmentsData":{"dev":{"G":"AA==","H":"AA=="}}}"#;
    let file = CommitmentFile::from_json(json).unwrap();
    assert_eq!(
      file.resolve(CommitmentEnvironment::Production).unwrap_err(),
      TokenError::Unavailable
    );
  }

  #[test]
  fn store_starts_unavailable_then_serves_published_snapshot() {
    let store = CommitmentStore::new();
    assert_eq!(store.snapshot().unwrap_err(), TokenError::Unavailable);

    let g = Point::generator();
    let h = g.scalar_mul(&crate::curve::Scalar::from(3u64));
    store.publish(Commitment { g, h });

    let snap = store.snapshot().unwrap();
    assert_eq!(snap.g, g);
    assert_eq!(snap.h, h);
  }

  #[test]
  fn store_publish_replaces_prior_snapshot() {
    let store = CommitmentStore::new();
    let g = Point::generator();
    store.publish(Commitment { g, h: g });
    let first = store.snapshot().unwrap();

    let h2 = g.scalar_mul(&crate::curve::Scalar::from(99u64));
    store.publish(Commitment { g, h: h2 });
    let second = store.snapshot().unwrap();

    assert_eq!(first.h, g);
    assert_eq!(second.h, h2);
  }
}
