use crate::{
  crypto::{HashAlgorithm, KeyFamily, SigningKey, VerifyingKey},
  error::{HttpSigError, HttpSigResult},
  key::CryptoKey,
};

/// Unified algorithm name where the signing family comes from the key
pub const HS2019: &str = "hs2019";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Signing family of an algorithm
pub enum Family {
  Hmac,
  Rsa,
  Dsa,
  Ec,
}

impl Family {
  /// Prefix used in legacy algorithm names
  pub fn as_str(&self) -> &'static str {
    match self {
      Family::Hmac => "hmac",
      Family::Rsa => "rsa",
      Family::Dsa => "dsa",
      Family::Ec => "ec",
    }
  }

  /// Family matching the class and type of a key
  pub fn of_key(key: &CryptoKey) -> Self {
    match key.key_type().map(|t| t.family) {
      None => Family::Hmac,
      Some(KeyFamily::Rsa) => Family::Rsa,
      Some(KeyFamily::Dsa) => Family::Dsa,
      Some(KeyFamily::Ec) => Family::Ec,
    }
  }
}

impl core::str::FromStr for Family {
  type Err = HttpSigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "hmac" => Ok(Self::Hmac),
      "rsa" => Ok(Self::Rsa),
      "dsa" => Ok(Self::Dsa),
      "ec" => Ok(Self::Ec),
      _ => Err(HttpSigError::AlgorithmError(format!("Unrecognised signature algorithm: '{s}'"))),
    }
  }
}

impl std::fmt::Display for Family {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/* ----------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Digest part of an algorithm name
pub enum DigestName {
  Sha1,
  Sha256,
  Sha384,
  Sha512,
  Hs2019,
}

impl DigestName {
  pub fn as_str(&self) -> &'static str {
    match self {
      DigestName::Sha1 => "sha1",
      DigestName::Sha256 => "sha256",
      DigestName::Sha384 => "sha384",
      DigestName::Sha512 => "sha512",
      DigestName::Hs2019 => HS2019,
    }
  }

  /// Hash function actually used, `hs2019` means sha512
  pub fn effective(&self) -> HashAlgorithm {
    match self {
      DigestName::Sha1 => HashAlgorithm::Sha1,
      DigestName::Sha256 => HashAlgorithm::Sha256,
      DigestName::Sha384 => HashAlgorithm::Sha384,
      DigestName::Sha512 | DigestName::Hs2019 => HashAlgorithm::Sha512,
    }
  }
}

impl core::str::FromStr for DigestName {
  type Err = HttpSigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "sha1" => Ok(Self::Sha1),
      "sha256" => Ok(Self::Sha256),
      "sha384" => Ok(Self::Sha384),
      "sha512" => Ok(Self::Sha512),
      HS2019 => Ok(Self::Hs2019),
      _ => Err(HttpSigError::AlgorithmError(format!("Unrecognised hash algorithm: '{s}'"))),
    }
  }
}

impl From<HashAlgorithm> for DigestName {
  fn from(hash: HashAlgorithm) -> Self {
    match hash {
      HashAlgorithm::Sha1 => DigestName::Sha1,
      HashAlgorithm::Sha256 => DigestName::Sha256,
      HashAlgorithm::Sha384 => DigestName::Sha384,
      HashAlgorithm::Sha512 => DigestName::Sha512,
    }
  }
}

impl std::fmt::Display for DigestName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/* ----------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Signature algorithm: a signing family and a digest
pub struct Algorithm {
  family: Family,
  digest: DigestName,
}

impl Algorithm {
  /// Map a legacy wire name such as `rsa-sha256` to an algorithm
  pub fn create(name: &str) -> HttpSigResult<Self> {
    let Some((family, digest)) = name.split_once('-') else {
      return Err(HttpSigError::AlgorithmError(format!("Unrecognised algorithm: '{name}'")));
    };
    let family = family.parse::<Family>()?;
    match digest.parse::<DigestName>()? {
      DigestName::Hs2019 => Err(HttpSigError::AlgorithmError(format!("Unrecognised algorithm: '{name}'"))),
      digest => Ok(Self { family, digest }),
    }
  }

  /// Build an algorithm from a family and a digest name, validating the digest now
  pub fn try_new(family: Family, digest: &str) -> HttpSigResult<Self> {
    Ok(Self {
      family,
      digest: digest.parse()?,
    })
  }

  /// Algorithm for signing with `key`, e.g. `hs2019` or `sha256`
  pub fn for_key(key: &CryptoKey, digest: &str) -> HttpSigResult<Self> {
    Self::try_new(Family::of_key(key), digest)
  }

  /// Resolve a wire name against the key it is used with.
  /// `hs2019` takes the family from the key, a legacy name must agree with it.
  pub fn resolve(name: &str, key: &CryptoKey) -> HttpSigResult<Self> {
    if name == HS2019 {
      return Self::for_key(key, HS2019);
    }
    let algorithm = Self::create(name)?;
    let key_family = Family::of_key(key);
    if algorithm.family != key_family {
      return Err(HttpSigError::AlgorithmError(format!(
        "Algorithm '{name}' cannot be used with key type '{key_family}'"
      )));
    }
    Ok(algorithm)
  }

  pub fn family(&self) -> Family {
    self.family
  }

  pub fn digest(&self) -> DigestName {
    self.digest
  }

  pub fn is_hs2019(&self) -> bool {
    self.digest == DigestName::Hs2019
  }

  /// `hs2019`, or `<family>-<digest>` for legacy algorithms
  pub fn name(&self) -> String {
    match self.digest {
      DigestName::Hs2019 => HS2019.to_string(),
      digest => format!("{}-{}", self.family, digest),
    }
  }

  /// Hash function used for signing, `hash_override` wins over the algorithm's own digest
  pub fn effective_hash(&self, hash_override: Option<HashAlgorithm>) -> HashAlgorithm {
    hash_override.unwrap_or_else(|| self.digest.effective())
  }

  /// Sign `data` with `key`
  pub fn sign(&self, key: &CryptoKey, data: &[u8], hash_override: Option<HashAlgorithm>) -> HttpSigResult<Vec<u8>> {
    self.check_key(key)?;
    let hash = self.effective_hash(hash_override);
    match self.family {
      Family::Hmac => key
        .shared_key()
        .ok_or_else(|| HttpSigError::AlgorithmError("No secret to compute hmac".to_string()))?
        .sign(data, hash),
      _ => key
        .private_key()
        .ok_or_else(|| HttpSigError::AlgorithmError(format!("Key '{}' cannot be used for signing", key.id())))?
        .sign(data, hash),
    }
  }

  /// Verify `signature` over `message` with `key`
  pub fn verify(
    &self,
    message: &[u8],
    signature: &[u8],
    key: &CryptoKey,
    hash_override: Option<HashAlgorithm>,
  ) -> HttpSigResult<bool> {
    self.check_key(key)?;
    let hash = self.effective_hash(hash_override);
    match self.family {
      Family::Hmac => Ok(
        key
          .shared_key()
          .ok_or_else(|| HttpSigError::AlgorithmError("No secret to compute hmac".to_string()))?
          .verify(message, signature, hash),
      ),
      _ => Ok(
        key
          .public_key()
          .ok_or_else(|| HttpSigError::AlgorithmError(format!("Key '{}' cannot be used for verifying", key.id())))?
          .verify(message, signature, hash),
      ),
    }
  }

  fn check_key(&self, key: &CryptoKey) -> HttpSigResult<()> {
    let key_family = Family::of_key(key);
    if key_family != self.family {
      return Err(HttpSigError::AlgorithmError(format!(
        "Algorithm '{}' cannot be used with key type '{key_family}'",
        self.name()
      )));
    }
    Ok(())
  }
}

impl std::fmt::Display for Algorithm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}
