use super::HashAlgorithm;
use crate::error::HttpSigResult;
use subtle::ConstantTimeEq;

/* -------------------------------- */
/// Shared secret for the hmac family
#[derive(Clone)]
pub struct SharedKey(Vec<u8>);

impl SharedKey {
  pub fn new(secret: &[u8]) -> Self {
    Self(secret.to_vec())
  }

  /// Compute the mac of the data
  pub fn sign(&self, data: &[u8], hash: HashAlgorithm) -> HttpSigResult<Vec<u8>> {
    hash.hmac(data, &self.0)
  }

  /// Verify the mac in constant time
  pub fn verify(&self, data: &[u8], expected_mac: &[u8], hash: HashAlgorithm) -> bool {
    match self.sign(data, hash) {
      Ok(calculated_mac) => calculated_mac.ct_eq(expected_mac).into(),
      Err(_) => false,
    }
  }
}

impl PartialEq for SharedKey {
  fn eq(&self, other: &Self) -> bool {
    self.0.ct_eq(&other.0).into()
  }
}

impl std::fmt::Debug for SharedKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("SharedKey(..)")
  }
}
