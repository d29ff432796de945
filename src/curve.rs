//! P-256 field/group primitives: point addition, scalar multiplication,
//! modular inverse, and the two SEC1 wire encodings plus the tag-less
//! persisted form.

use elliptic_curve::point::DecompressPoint as _;
use elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use group::ff::{Field, PrimeField};
use group::{prime::PrimeCurveAffine, Curve as _, Group as _};
use subtle::Choice;

use p256::{AffinePoint, EncodedPoint, NistP256, ProjectivePoint};

use crate::error::{TokenError, TokenResult};

/// A scalar in `[0, r)` where `r` is the P-256 group order.
pub type Scalar = p256::Scalar;

/// The 32-byte big-endian representation backing both `Scalar` and a field
/// element's x-coordinate.
pub type FieldBytes = elliptic_curve::FieldBytes<NistP256>;

/// An affine P-256 curve point, or the identity.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Point(AffinePoint);

impl std::fmt::Debug for Point {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Point({})", hex::encode(self.sec1_encode()))
  }
}

impl Point {
  pub fn from_affine(affine: AffinePoint) -> Self {
    Self(affine)
  }

  pub fn to_affine(&self) -> AffinePoint {
    self.0
  }

  pub fn to_projective(&self) -> ProjectivePoint {
    ProjectivePoint::from(self.0)
  }

  pub fn generator() -> Self {
    Self(AffinePoint::generator())
  }

  pub fn identity() -> Self {
    Self(AffinePoint::identity())
  }

  pub fn is_identity(&self) -> bool {
    bool::from(self.0.is_identity())
  }

  pub fn add(&self, other: &Self) -> Self {
    Self((self.to_projective() + other.to_projective()).to_affine())
  }

  pub fn scalar_mul(&self, scalar: &Scalar) -> Self {
    Self((self.to_projective() * scalar).to_affine())
  }

  /// `0x04 || X || Y`, 65 bytes.
  pub fn sec1_encode(&self) -> [u8; 65] {
    let encoded = self.0.to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(encoded.as_bytes());
    out
  }

  /// Requires a leading `0x04` tag; any other leading byte is a `TagError`.
  pub fn sec1_decode(bytes: &[u8]) -> TokenResult<Self> {
    match bytes.first() {
      Some(0x04) => {}
      Some(_) => return Err(TokenError::TagError),
      None => return Err(TokenError::MalformedInput("empty point encoding".into())),
    }
    let encoded = EncodedPoint::from_bytes(bytes)
      .map_err(|e| TokenError::MalformedInput(format!("invalid SEC1 encoding: {e}")))?;
    Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
      .map(Self)
      .ok_or(TokenError::OffCurve)
  }

  /// `tag || X`, 33 bytes. `tag = 0x02 + (y & 1)`.
  pub fn compress(&self) -> [u8; 33] {
    let encoded = self.0.to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(encoded.as_bytes());
    out
  }

  pub fn decompress(bytes: &[u8]) -> TokenResult<Self> {
    if bytes.len() != 33 {
      return Err(TokenError::MalformedInput("compressed point must be 33 bytes".into()));
    }
    let tag = bytes[0];
    if tag != 0x02 && tag != 0x03 {
      return Err(TokenError::TagError);
    }
    let x = FieldBytes::clone_from_slice(&bytes[1..]);
    decompress_point(&x, tag).ok_or(TokenError::OffCurve)
  }

  /// Tag-less `X || Y`, 64 bytes, used for external storage (distinct from
  /// the SEC1 encodings, §6).
  pub fn to_persisted_bytes(&self) -> [u8; 64] {
    let encoded = self.sec1_encode();
    let mut out = [0u8; 64];
    out.copy_from_slice(&encoded[1..]);
    out
  }

  pub fn from_persisted_bytes(bytes: &[u8]) -> TokenResult<Self> {
    if bytes.len() != 64 {
      return Err(TokenError::MalformedInput("persisted point must be 64 bytes".into()));
    }
    let mut sec1 = [0u8; 65];
    sec1[0] = 0x04;
    sec1[1..].copy_from_slice(bytes);
    Self::sec1_decode(&sec1)
  }
}

/// `DecompressPoint(xBits, tag) -> Point | bot`. `tag` must be `0x02` or
/// `0x03`; any other value is treated as odd/even via its low bit, matching
/// the issuer's behavior of never constructing any other tag.
pub fn decompress_point(x_bytes: &FieldBytes, tag: u8) -> Option<Point> {
  let y_is_odd = Choice::from(tag & 1);
  Option::from(AffinePoint::decompress(x_bytes, y_is_odd)).map(Point::from_affine)
}

/// `scalar^-1 mod r`. Fails with `InvalidScalar` if `scalar = 0`.
pub fn invert_scalar(scalar: &Scalar) -> TokenResult<Scalar> {
  Option::from(scalar.invert()).ok_or(TokenError::InvalidScalar)
}

/// Parses a big-endian integer of at most 32 bytes as a scalar, rejecting
/// values `>= r` (and anything longer than 32 bytes) the way the batch-proof
/// parser and the masked SHAKE sampler both need.
pub fn scalar_from_be_bytes(bytes: &[u8]) -> Option<Scalar> {
  if bytes.len() > 32 {
    return None;
  }
  let mut padded = FieldBytes::default();
  let offset = 32 - bytes.len();
  padded[offset..].copy_from_slice(bytes);
  Option::from(Scalar::from_repr(padded))
}

pub fn scalar_to_be_bytes(scalar: &Scalar) -> FieldBytes {
  scalar.to_repr()
}
