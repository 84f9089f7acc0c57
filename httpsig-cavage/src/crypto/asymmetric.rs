use super::{HashAlgorithm, KeyFamily, KeyType};
use crate::error::{HttpSigError, HttpSigResult};
use tracing::debug;
use ecdsa::{
  elliptic_curve::{sec1::ToEncodedPoint, PublicKey as EcPublicKey, SecretKey as EcSecretKey},
  signature::hazmat::{PrehashSigner, PrehashVerifier},
};
use p256::NistP256;
use p384::NistP384;
use pkcs8::{der::Decode, DecodePrivateKey, Document, PrivateKeyInfo};
use rsa::{
  pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
  Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
};
use sha2::Digest;
use signature::{DigestSigner, DigestVerifier, SignatureEncoding};
use spki::{DecodePublicKey, SubjectPublicKeyInfoRef};

#[allow(non_upper_case_globals, dead_code)]
/// Algorithm OIDs
mod algorithm_oids {
  /// OID for `rsaEncryption`
  pub const RSA: &str = "1.2.840.113549.1.1.1";
  /// OID for `id-dsa`
  pub const DSA: &str = "1.2.840.10040.4.1";
  /// OID for `id-ecPublicKey`
  pub const EC: &str = "1.2.840.10045.2.1";
}
#[allow(non_upper_case_globals, dead_code)]
/// Params OIDs
mod params_oids {
  // OID for the NIST P-256 elliptic curve.
  pub const Secp256r1: &str = "1.2.840.10045.3.1.7";
  // OID for the NIST P-384 elliptic curve.
  pub const Secp384r1: &str = "1.3.132.0.34";
}

const P256_CURVE_NAME: &str = "prime256v1";
const P384_CURVE_NAME: &str = "secp384r1";

/* -------------------------------- */
/// Private key of an asymmetric family
#[derive(Clone)]
pub enum PrivateKey {
  Rsa(RsaPrivateKey),
  Dsa(dsa::SigningKey),
  EcP256(EcSecretKey<NistP256>),
  EcP384(EcSecretKey<NistP384>),
}

impl PrivateKey {
  /// Derive private key from PKCS#8 der bytes
  pub fn from_der(der: &[u8]) -> HttpSigResult<Self> {
    let pki = PrivateKeyInfo::from_der(der).map_err(|e| HttpSigError::KeyError(e.to_string()))?;

    match pki.algorithm.oid.to_string().as_ref() {
      algorithm_oids::RSA => {
        debug!("Read RSA private key");
        let sk = RsaPrivateKey::from_pkcs8_der(der).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        Ok(Self::Rsa(sk))
      }
      algorithm_oids::DSA => {
        debug!("Read DSA private key");
        let sk = dsa::SigningKey::from_pkcs8_der(der).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        Ok(Self::Dsa(sk))
      }
      algorithm_oids::EC => {
        debug!("Read EC private key");
        let param = pki
          .algorithm
          .parameters_oid()
          .map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        let sk_bytes = sec1::EcPrivateKey::try_from(pki.private_key)
          .map_err(|e| HttpSigError::KeyError(format!("Error decoding EcPrivateKey: {e}")))?
          .private_key;
        Self::from_ec_bytes(&param.to_string(), sk_bytes)
      }
      _ => Err(HttpSigError::KeyError(
        "Unsupported algorithm that supports PEM format keys".to_string(),
      )),
    }
  }

  /// Derive private key from pem string, PKCS#8, PKCS#1 (RSA) or SEC1 (EC)
  pub fn from_pem(pem: &str) -> HttpSigResult<Self> {
    let (tag, doc) = Document::from_pem(pem.trim()).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
    match tag {
      "PRIVATE KEY" => Self::from_der(doc.as_bytes()),
      "RSA PRIVATE KEY" => {
        debug!("Read PKCS#1 RSA private key");
        let sk = RsaPrivateKey::from_pkcs1_der(doc.as_bytes()).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        Ok(Self::Rsa(sk))
      }
      "EC PRIVATE KEY" => {
        debug!("Read SEC1 EC private key");
        let ec = sec1::EcPrivateKey::from_der(doc.as_bytes()).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        let curve = ec
          .parameters
          .and_then(|p| p.named_curve())
          .ok_or(HttpSigError::KeyError("EC private key without named curve".to_string()))?;
        Self::from_ec_bytes(&curve.to_string(), ec.private_key)
      }
      _ => Err(HttpSigError::KeyError(format!("Not a private key: {tag}"))),
    }
  }

  fn from_ec_bytes(curve_oid: &str, sk_bytes: &[u8]) -> HttpSigResult<Self> {
    match curve_oid {
      params_oids::Secp256r1 => {
        let sk = p256::SecretKey::from_slice(sk_bytes).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        Ok(Self::EcP256(sk))
      }
      params_oids::Secp384r1 => {
        let sk = p384::SecretKey::from_slice(sk_bytes).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        Ok(Self::EcP384(sk))
      }
      _ => Err(HttpSigError::KeyError("Unsupported curve".to_string())),
    }
  }

  /// Get public key from private key
  pub fn public_key(&self) -> PublicKey {
    match &self {
      Self::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
      Self::Dsa(key) => PublicKey::Dsa(key.verifying_key().clone()),
      Self::EcP256(key) => PublicKey::EcP256(key.public_key()),
      Self::EcP384(key) => PublicKey::EcP384(key.public_key()),
    }
  }
}

impl super::SigningKey for PrivateKey {
  /// Sign data
  fn sign(&self, data: &[u8], hash: HashAlgorithm) -> HttpSigResult<Vec<u8>> {
    match &self {
      Self::Rsa(sk) => {
        let hashed = hash.hash(data);
        sk.sign(rsa_padding(hash), &hashed)
          .map_err(|e| HttpSigError::AlgorithmError(e.to_string()))
      }
      Self::Dsa(sk) => {
        let sig: dsa::Signature = match hash {
          HashAlgorithm::Sha1 => sk.try_sign_digest(sha1::Sha1::new_with_prefix(data)),
          HashAlgorithm::Sha256 => sk.try_sign_digest(sha2::Sha256::new_with_prefix(data)),
          HashAlgorithm::Sha384 => sk.try_sign_digest(sha2::Sha384::new_with_prefix(data)),
          HashAlgorithm::Sha512 => sk.try_sign_digest(sha2::Sha512::new_with_prefix(data)),
        }
        .map_err(|e| HttpSigError::AlgorithmError(e.to_string()))?;
        Ok(sig.to_bytes().into_vec())
      }
      Self::EcP256(sk) => {
        let sk = ecdsa::SigningKey::from(sk);
        let prehash = ec_prehash(hash.hash(data), 32);
        let sig: ecdsa::Signature<NistP256> = sk
          .sign_prehash(&prehash)
          .map_err(|e| HttpSigError::AlgorithmError(e.to_string()))?;
        Ok(sig.to_der().as_bytes().to_vec())
      }
      Self::EcP384(sk) => {
        let sk = ecdsa::SigningKey::from(sk);
        let prehash = ec_prehash(hash.hash(data), 48);
        let sig: ecdsa::Signature<NistP384> = sk
          .sign_prehash(&prehash)
          .map_err(|e| HttpSigError::AlgorithmError(e.to_string()))?;
        Ok(sig.to_der().as_bytes().to_vec())
      }
    }
  }

  fn key_type(&self) -> KeyType {
    use super::VerifyingKey;
    self.public_key().key_type()
  }
}

impl PartialEq for PrivateKey {
  fn eq(&self, other: &Self) -> bool {
    self.public_key() == other.public_key()
  }
}

impl std::fmt::Debug for PrivateKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use super::SigningKey;
    write!(f, "PrivateKey({:?})", self.key_type())
  }
}

/* -------------------------------- */
/// Public key of an asymmetric family
#[derive(Clone)]
pub enum PublicKey {
  Rsa(RsaPublicKey),
  Dsa(dsa::VerifyingKey),
  EcP256(EcPublicKey<NistP256>),
  EcP384(EcPublicKey<NistP384>),
}

impl PublicKey {
  /// Convert from SubjectPublicKeyInfo der bytes
  pub fn from_der(der: &[u8]) -> HttpSigResult<Self> {
    let spki_ref = SubjectPublicKeyInfoRef::from_der(der)
      .map_err(|e| HttpSigError::KeyError(format!("Error decoding SubjectPublicKeyInfo: {e}")))?;
    match spki_ref.algorithm.oid.to_string().as_ref() {
      algorithm_oids::RSA => {
        let pk = RsaPublicKey::from_public_key_der(der).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        Ok(Self::Rsa(pk))
      }
      algorithm_oids::DSA => {
        let pk = dsa::VerifyingKey::from_public_key_der(der).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        Ok(Self::Dsa(pk))
      }
      algorithm_oids::EC => {
        let param = spki_ref
          .algorithm
          .parameters_oid()
          .map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        let public_key = spki_ref
          .subject_public_key
          .as_bytes()
          .ok_or(HttpSigError::KeyError("Invalid public key".to_string()))?;
        match param.to_string().as_ref() {
          params_oids::Secp256r1 => {
            let pk =
              EcPublicKey::<NistP256>::from_sec1_bytes(public_key).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
            Ok(Self::EcP256(pk))
          }
          params_oids::Secp384r1 => {
            let pk =
              EcPublicKey::<NistP384>::from_sec1_bytes(public_key).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
            Ok(Self::EcP384(pk))
          }
          _ => Err(HttpSigError::KeyError("Unsupported curve".to_string())),
        }
      }
      _ => Err(HttpSigError::KeyError(
        "Unsupported algorithm that supports PEM format keys".to_string(),
      )),
    }
  }

  /// Convert from pem string, SubjectPublicKeyInfo or PKCS#1 (RSA)
  pub fn from_pem(pem: &str) -> HttpSigResult<Self> {
    let (tag, doc) = Document::from_pem(pem.trim()).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
    match tag {
      "PUBLIC KEY" => Self::from_der(doc.as_bytes()),
      "RSA PUBLIC KEY" => {
        let pk = RsaPublicKey::from_pkcs1_der(doc.as_bytes()).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
        Ok(Self::Rsa(pk))
      }
      _ => Err(HttpSigError::KeyError(format!("Not a public key: {tag}"))),
    }
  }

  /// Extract the subject public key of a pem encoded X.509 certificate
  pub fn from_certificate_pem(pem: &str) -> HttpSigResult<Self> {
    use x509_cert::der::Encode;

    let (tag, doc) = Document::from_pem(pem.trim()).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
    if tag != "CERTIFICATE" {
      return Err(HttpSigError::KeyError(format!("Not a certificate: {tag}")));
    }
    let cert = x509_cert::Certificate::from_der(doc.as_bytes()).map_err(|e| HttpSigError::KeyError(e.to_string()))?;
    let spki_der = cert
      .tbs_certificate
      .subject_public_key_info
      .to_der()
      .map_err(|e| HttpSigError::KeyError(e.to_string()))?;
    Self::from_der(&spki_der)
  }
}

impl super::VerifyingKey for PublicKey {
  /// Verify signature
  fn verify(&self, data: &[u8], signature: &[u8], hash: HashAlgorithm) -> bool {
    let res = match self {
      Self::Rsa(pk) => {
        let hashed = hash.hash(data);
        pk.verify(rsa_padding(hash), &hashed, signature)
          .map_err(|e| e.to_string())
      }
      Self::Dsa(pk) => match dsa::Signature::try_from(signature) {
        Ok(sig) => match hash {
          HashAlgorithm::Sha1 => pk.verify_digest(sha1::Sha1::new_with_prefix(data), &sig),
          HashAlgorithm::Sha256 => pk.verify_digest(sha2::Sha256::new_with_prefix(data), &sig),
          HashAlgorithm::Sha384 => pk.verify_digest(sha2::Sha384::new_with_prefix(data), &sig),
          HashAlgorithm::Sha512 => pk.verify_digest(sha2::Sha512::new_with_prefix(data), &sig),
        }
        .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
      },
      Self::EcP256(pk) => ecdsa::Signature::<NistP256>::from_der(signature)
        .and_then(|sig| ecdsa::VerifyingKey::from(pk).verify_prehash(&ec_prehash(hash.hash(data), 32), &sig))
        .map_err(|e| e.to_string()),
      Self::EcP384(pk) => ecdsa::Signature::<NistP384>::from_der(signature)
        .and_then(|sig| ecdsa::VerifyingKey::from(pk).verify_prehash(&ec_prehash(hash.hash(data), 48), &sig))
        .map_err(|e| e.to_string()),
    };
    match res {
      Ok(()) => true,
      Err(e) => {
        debug!("Asymmetric signature rejected: {e}");
        false
      }
    }
  }

  fn key_type(&self) -> KeyType {
    match self {
      Self::Rsa(_) => KeyType {
        family: KeyFamily::Rsa,
        curve: None,
      },
      Self::Dsa(_) => KeyType {
        family: KeyFamily::Dsa,
        curve: None,
      },
      Self::EcP256(_) => KeyType {
        family: KeyFamily::Ec,
        curve: Some(P256_CURVE_NAME),
      },
      Self::EcP384(_) => KeyType {
        family: KeyFamily::Ec,
        curve: Some(P384_CURVE_NAME),
      },
    }
  }
}

impl PartialEq for PublicKey {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Rsa(a), Self::Rsa(b)) => a == b,
      (Self::Dsa(a), Self::Dsa(b)) => {
        let (ca, cb) = (a.components(), b.components());
        a.y() == b.y() && ca.p() == cb.p() && ca.q() == cb.q() && ca.g() == cb.g()
      }
      (Self::EcP256(a), Self::EcP256(b)) => a.to_encoded_point(true) == b.to_encoded_point(true),
      (Self::EcP384(a), Self::EcP384(b)) => a.to_encoded_point(true) == b.to_encoded_point(true),
      _ => false,
    }
  }
}

impl std::fmt::Debug for PublicKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use super::VerifyingKey;
    write!(f, "PublicKey({:?})", self.key_type())
  }
}

/* -------------------------------- */
/// PKCS#1 v1.5 padding carrying the digest info of `hash`
fn rsa_padding(hash: HashAlgorithm) -> Pkcs1v15Sign {
  match hash {
    HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<sha1::Sha1>(),
    HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
    HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<sha2::Sha384>(),
    HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
  }
}

/// Digests shorter than the curve order are left padded, which keeps their integer value
fn ec_prehash(digest: Vec<u8>, field_len: usize) -> Vec<u8> {
  if digest.len() >= field_len {
    return digest;
  }
  let mut padded = vec![0u8; field_len - digest.len()];
  padded.extend_from_slice(&digest);
  padded
}
