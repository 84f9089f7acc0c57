use crate::{
  crypto::{HashAlgorithm, KeyType, PrivateKey, PublicKey, SharedKey, VerifyingKey},
  error::{HttpSigError, HttpSigResult},
};
use tracing::debug;

/// Prefix of a credential blob that names a file to read the material from
const FILE_SCHEME: &str = "file://";
const PEM_MARKER: &str = "-----BEGIN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether a key is a shared secret or asymmetric key material
pub enum KeyClass {
  Secret,
  Asymmetric,
}

#[derive(Clone)]
enum KeyMaterial {
  Secret(SharedKey),
  Asymmetric {
    private_key: Option<PrivateKey>,
    public_key: PublicKey,
  },
}

/* ----------------------------------------------------------------- */
/// Classified key material registered under a key id
#[derive(Clone)]
pub struct CryptoKey {
  id: String,
  material: KeyMaterial,
  hash_algorithm: Option<HashAlgorithm>,
}

impl CryptoKey {
  /// Build a key from one or more credential blobs.
  /// Each blob may be a private key, a certificate, a public key (all in PEM), a `file://` path to one of them,
  /// or a raw secret.
  pub fn try_new(id: &str, blobs: &[&str]) -> HttpSigResult<Self> {
    let mut secret: Option<SharedKey> = None;
    let mut private_key: Option<PrivateKey> = None;
    let mut public_key: Option<PublicKey> = None;

    for blob in blobs {
      match probe(&load_blob(blob)?)? {
        Probed::Private(sk) => merge_slot(&mut private_key, sk, "private keys")?,
        Probed::Public(pk) => merge_slot(&mut public_key, pk, "public keys")?,
        Probed::Secret(s) => merge_slot(&mut secret, s, "secrets")?,
      }
    }

    let material = match (secret, private_key, public_key) {
      (Some(s), None, None) => KeyMaterial::Secret(s),
      (Some(_), _, _) => {
        return Err(HttpSigError::KeyError(
          "Private / public key material mixed with a secret".to_string(),
        ))
      }
      (None, Some(sk), Some(pk)) => {
        if sk.public_key() != pk {
          return Err(HttpSigError::KeyError("Private and public key do not match".to_string()));
        }
        KeyMaterial::Asymmetric {
          private_key: Some(sk),
          public_key: pk,
        }
      }
      (None, Some(sk), None) => KeyMaterial::Asymmetric {
        public_key: sk.public_key(),
        private_key: Some(sk),
      },
      (None, None, Some(pk)) => KeyMaterial::Asymmetric {
        private_key: None,
        public_key: pk,
      },
      (None, None, None) => return Err(HttpSigError::KeyError(format!("No key material provided for {id}"))),
    };

    let key = Self {
      id: id.to_string(),
      material,
      hash_algorithm: None,
    };
    debug!("Loaded key {key:?}");
    Ok(key)
  }

  /// Build a key from a raw secret without probing its shape
  pub fn from_secret(id: &str, secret: &[u8]) -> Self {
    Self {
      id: id.to_string(),
      material: KeyMaterial::Secret(SharedKey::new(secret)),
      hash_algorithm: None,
    }
  }

  /// Pin the hash algorithm used with this key, whatever the signature algorithm says
  pub fn with_hash_algorithm(mut self, hash: HashAlgorithm) -> Self {
    self.hash_algorithm = Some(hash);
    self
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn class(&self) -> KeyClass {
    match self.material {
      KeyMaterial::Secret(_) => KeyClass::Secret,
      KeyMaterial::Asymmetric { .. } => KeyClass::Asymmetric,
    }
  }

  /// Family and curve, `None` for secrets
  pub fn key_type(&self) -> Option<KeyType> {
    match &self.material {
      KeyMaterial::Secret(_) => None,
      KeyMaterial::Asymmetric { public_key, .. } => Some(public_key.key_type()),
    }
  }

  /// Short type name: `hmac` for secrets, otherwise the asymmetric family
  pub fn type_name(&self) -> &'static str {
    self.key_type().map(|t| t.family.as_str()).unwrap_or("hmac")
  }

  pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
    self.hash_algorithm
  }

  pub fn shared_key(&self) -> Option<&SharedKey> {
    match &self.material {
      KeyMaterial::Secret(s) => Some(s),
      _ => None,
    }
  }

  pub fn private_key(&self) -> Option<&PrivateKey> {
    match &self.material {
      KeyMaterial::Asymmetric { private_key, .. } => private_key.as_ref(),
      _ => None,
    }
  }

  pub fn public_key(&self) -> Option<&PublicKey> {
    match &self.material {
      KeyMaterial::Asymmetric { public_key, .. } => Some(public_key),
      _ => None,
    }
  }
}

impl std::fmt::Debug for CryptoKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CryptoKey")
      .field("id", &self.id)
      .field("class", &self.class())
      .field("key_type", &self.key_type())
      .field("has_private_key", &self.private_key().is_some())
      .field("hash_algorithm", &self.hash_algorithm)
      .finish()
  }
}

/* ----------------------------------------------------------------- */
enum Probed {
  Private(PrivateKey),
  Public(PublicKey),
  Secret(SharedKey),
}

/// Read `file://` blobs from disk, pass everything else through
fn load_blob(blob: &str) -> HttpSigResult<String> {
  match blob.strip_prefix(FILE_SCHEME) {
    Some(path) => std::fs::read_to_string(path).map_err(|e| HttpSigError::KeyError(format!("Cannot read {path}: {e}"))),
    None => Ok(blob.to_string()),
  }
}

/// Classify a blob, trying private key, certificate, public key, then secret
fn probe(blob: &str) -> HttpSigResult<Probed> {
  if let Some(sk) = try_parse_private_key(blob) {
    return Ok(Probed::Private(sk));
  }
  if let Some(pk) = try_parse_certificate(blob) {
    return Ok(Probed::Public(pk));
  }
  if let Some(pk) = try_parse_public_key(blob) {
    return Ok(Probed::Public(pk));
  }
  if blob.contains(PEM_MARKER) {
    return Err(HttpSigError::KeyError("PEM found but key not understood".to_string()));
  }
  Ok(Probed::Secret(SharedKey::new(blob.as_bytes())))
}

fn try_parse_private_key(blob: &str) -> Option<PrivateKey> {
  match PrivateKey::from_pem(blob) {
    Ok(sk) => Some(sk),
    Err(e) => {
      debug!("Not a private key: {e}");
      None
    }
  }
}

fn try_parse_certificate(blob: &str) -> Option<PublicKey> {
  match PublicKey::from_certificate_pem(blob) {
    Ok(pk) => Some(pk),
    Err(e) => {
      debug!("Not a certificate: {e}");
      None
    }
  }
}

fn try_parse_public_key(blob: &str) -> Option<PublicKey> {
  match PublicKey::from_pem(blob) {
    Ok(pk) => Some(pk),
    Err(e) => {
      debug!("Not a public key: {e}");
      None
    }
  }
}

/// Fill a slot, accepting a repeated value only when it is identical
fn merge_slot<T: PartialEq>(slot: &mut Option<T>, value: T, what: &str) -> HttpSigResult<()> {
  match slot {
    Some(existing) if *existing != value => Err(HttpSigError::KeyError(format!("Multiple different {what} provided"))),
    Some(_) => Ok(()),
    None => {
      *slot = Some(value);
      Ok(())
    }
  }
}
