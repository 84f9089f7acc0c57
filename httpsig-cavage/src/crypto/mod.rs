mod asymmetric;
mod symmetric;

use crate::error::{HttpSigError, HttpSigResult};
use hmac::{digest::KeyInit, Hmac, Mac};
use sha2::Digest;

pub use asymmetric::{PrivateKey, PublicKey};
pub use symmetric::SharedKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Hash functions usable for signing, mac and body digests
pub enum HashAlgorithm {
  Sha1,
  Sha256,
  Sha384,
  Sha512,
}

impl HashAlgorithm {
  pub fn as_str(&self) -> &'static str {
    match self {
      HashAlgorithm::Sha1 => "sha1",
      HashAlgorithm::Sha256 => "sha256",
      HashAlgorithm::Sha384 => "sha384",
      HashAlgorithm::Sha512 => "sha512",
    }
  }

  /// Hash `data`
  pub fn hash(&self, data: &[u8]) -> Vec<u8> {
    match self {
      HashAlgorithm::Sha1 => sha1::Sha1::digest(data).to_vec(),
      HashAlgorithm::Sha256 => sha2::Sha256::digest(data).to_vec(),
      HashAlgorithm::Sha384 => sha2::Sha384::digest(data).to_vec(),
      HashAlgorithm::Sha512 => sha2::Sha512::digest(data).to_vec(),
    }
  }

  /// Keyed hash of `data` with `secret`
  pub fn hmac(&self, data: &[u8], secret: &[u8]) -> HttpSigResult<Vec<u8>> {
    match self {
      HashAlgorithm::Sha1 => mac_with::<Hmac<sha1::Sha1>>(data, secret),
      HashAlgorithm::Sha256 => mac_with::<Hmac<sha2::Sha256>>(data, secret),
      HashAlgorithm::Sha384 => mac_with::<Hmac<sha2::Sha384>>(data, secret),
      HashAlgorithm::Sha512 => mac_with::<Hmac<sha2::Sha512>>(data, secret),
    }
  }
}

fn mac_with<M: Mac + KeyInit>(data: &[u8], secret: &[u8]) -> HttpSigResult<Vec<u8>> {
  let mut mac = <M as Mac>::new_from_slice(secret).map_err(|e| HttpSigError::AlgorithmError(e.to_string()))?;
  mac.update(data);
  Ok(mac.finalize().into_bytes().to_vec())
}

impl std::fmt::Display for HashAlgorithm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl core::str::FromStr for HashAlgorithm {
  type Err = HttpSigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "sha1" => Ok(Self::Sha1),
      "sha256" => Ok(Self::Sha256),
      "sha384" => Ok(Self::Sha384),
      "sha512" => Ok(Self::Sha512),
      _ => Err(HttpSigError::AlgorithmError(format!("Unsupported hash algorithm: {s}"))),
    }
  }
}

/* ----------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Asymmetric key families
pub enum KeyFamily {
  Rsa,
  Dsa,
  Ec,
}

impl KeyFamily {
  pub fn as_str(&self) -> &'static str {
    match self {
      KeyFamily::Rsa => "rsa",
      KeyFamily::Dsa => "dsa",
      KeyFamily::Ec => "ec",
    }
  }
}

impl std::fmt::Display for KeyFamily {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Family of an asymmetric key, and the curve name for EC keys
pub struct KeyType {
  pub family: KeyFamily,
  /// OpenSSL short name of the curve, e.g. `prime256v1`
  pub curve: Option<&'static str>,
}

/// SigningKey trait
pub trait SigningKey {
  fn sign(&self, data: &[u8], hash: HashAlgorithm) -> HttpSigResult<Vec<u8>>;
  fn key_type(&self) -> KeyType;
}

/// VerifyingKey trait
pub trait VerifyingKey {
  /// True only when the signature was positively verified
  fn verify(&self, data: &[u8], signature: &[u8], hash: HashAlgorithm) -> bool;
  fn key_type(&self) -> KeyType;
}

#[cfg(test)]
mod tests {
  use super::*;
  use base64::{engine::general_purpose, Engine as _};

  #[test]
  fn hash_lengths() {
    assert_eq!(HashAlgorithm::Sha1.hash(b"").len(), 20);
    assert_eq!(HashAlgorithm::Sha256.hash(b"").len(), 32);
    assert_eq!(HashAlgorithm::Sha384.hash(b"").len(), 48);
    assert_eq!(HashAlgorithm::Sha512.hash(b"").len(), 64);
  }

  #[test]
  fn hmac_known_answer() {
    // RFC 4231 test case 2
    let mac = HashAlgorithm::Sha256
      .hmac(b"what do ya want for nothing?", b"Jefe")
      .unwrap();
    assert_eq!(
      general_purpose::STANDARD.encode(mac),
      "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM="
    );
  }

  #[test]
  fn hash_name_round_trip() {
    for name in ["sha1", "sha256", "sha384", "sha512"] {
      assert_eq!(name.parse::<HashAlgorithm>().unwrap().to_string(), name);
    }
    assert!("md5".parse::<HashAlgorithm>().is_err());
  }
}
