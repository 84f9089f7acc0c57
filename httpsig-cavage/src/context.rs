use crate::{
  algorithm::{Algorithm, DigestName, Family, HS2019},
  body_digest::BodyDigest,
  error::{HttpSigError, HttpSigResult},
  header_list::HeaderList,
  key::CryptoKey,
  key_store::{KeyResolver, KeyStore},
  message::HttpMessage,
  signature_dates::SignatureDates,
  signer::Signer,
  verifier::Verifier,
};
use std::sync::Arc;

const DEFAULT_CREATED: &str = "now";
const DEFAULT_EXPIRES: &str = "none";

#[derive(Debug, Clone)]
/// One-stop configuration of keys, algorithm, covered headers and dates for signing,
/// and the key store for verifying.
pub struct Context {
  key_store: Arc<KeyStore>,
  signing_key_id: Option<String>,
  /// Family pinned by a legacy algorithm name, otherwise taken from the key
  family: Option<Family>,
  digest: DigestName,
  headers: Option<HeaderList>,
  created: String,
  expires: String,
  digest_hash_algorithm: Option<String>,
}

impl Context {
  pub fn new(key_store: KeyStore) -> Self {
    Self::with_shared_key_store(Arc::new(key_store))
  }

  /// Context over a key store shared with other components
  pub fn with_shared_key_store(key_store: Arc<KeyStore>) -> Self {
    Self {
      key_store,
      signing_key_id: None,
      family: None,
      digest: DigestName::Hs2019,
      headers: None,
      created: DEFAULT_CREATED.to_string(),
      expires: DEFAULT_EXPIRES.to_string(),
      digest_hash_algorithm: None,
    }
  }

  /// Context over keys built from `(key id, credential blobs)` entries
  pub fn from_keys(entries: &[(&str, &[&str])]) -> HttpSigResult<Self> {
    Ok(Self::new(KeyStore::from_blobs(entries)?))
  }

  pub fn key_store(&self) -> &Arc<KeyStore> {
    &self.key_store
  }

  /// `hs2019`, or `<family>-<digest>` with family hmac, rsa, dsa or ec and digest sha1, sha256, sha384 or sha512.
  /// An empty name means `hs2019`.
  pub fn set_algorithm(&mut self, name: &str) -> HttpSigResult<&mut Self> {
    if name.is_empty() || name == HS2019 {
      self.family = None;
      self.digest = DigestName::Hs2019;
      return Ok(self);
    }
    let Some((family, digest)) = name.split_once('-') else {
      return Err(HttpSigError::ContextError(format!("Unrecognised algorithm: '{name}'")));
    };
    let family = family.parse::<Family>()?;
    let digest = match digest.parse::<DigestName>() {
      Ok(DigestName::Hs2019) | Err(_) => {
        return Err(HttpSigError::AlgorithmError(format!(
          "Unrecognised hash algorithm: '{digest}'"
        )))
      }
      Ok(digest) => digest,
    };
    self.family = Some(family);
    self.digest = digest;
    Ok(self)
  }

  /// Digest part of the algorithm, leaving the family to the key. `sha256` turns `hs2019` into e.g. `rsa-sha256`.
  pub fn set_hash_algorithm(&mut self, name: &str) -> HttpSigResult<&mut Self> {
    self.digest = name.parse()?;
    Ok(self)
  }

  /// Hash of the `Digest` header set by the `*_with_digest` operations
  pub fn set_digest_hash_algorithm(&mut self, name: &str) -> HttpSigResult<&mut Self> {
    BodyDigest::from_hash_name(Some(name))?;
    self.digest_hash_algorithm = Some(name.to_string());
    Ok(self)
  }

  /// Covered headers, in signing string order
  pub fn set_headers<T: AsRef<str>>(&mut self, headers: &[T]) -> HttpSigResult<&mut Self> {
    self.headers = Some(HeaderList::try_new(headers)?);
    Ok(self)
  }

  /// Covered headers as a space separated list
  pub fn set_headers_string(&mut self, headers: &str) -> HttpSigResult<&mut Self> {
    self.headers = Some(HeaderList::from_string(headers)?);
    Ok(self)
  }

  /// Fall back to the implicit header list
  pub fn unset_headers(&mut self) -> &mut Self {
    self.headers = None;
    self
  }

  pub fn set_signing_key_id(&mut self, key_id: &str) -> &mut Self {
    self.signing_key_id = Some(key_id.to_string());
    self
  }

  /// Offset expression of `created`, see [`SignatureDates::offset`]
  pub fn set_created(&mut self, offset: &str) -> &mut Self {
    self.created = offset.to_string();
    self
  }

  /// Offset expression of `expires` relative to `created`, see [`SignatureDates::offset`]
  pub fn set_expires(&mut self, offset: &str) -> &mut Self {
    self.expires = offset.to_string();
    self
  }

  /// Build a signer for the current configuration.
  /// With `strict_dates`, a `created` in the future or an `expires` in the past is an error.
  pub fn signer(&self, strict_dates: bool) -> HttpSigResult<Signer> {
    let key = self.signing_key()?;
    let key_family = Family::of_key(&key);
    if let Some(family) = self.family.filter(|f| *f != key_family) {
      return Err(HttpSigError::ContextError(format!(
        "Signature algorithm '{family}' cannot be used with signing key type '{key_family}'"
      )));
    }
    let algorithm = Algorithm::try_new(key_family, self.digest.as_str())?;
    let header_list = match &self.headers {
      Some(headers) => headers.clone(),
      None => HeaderList::implicit_default(algorithm.is_hs2019()),
    };
    let dates = self.signature_dates(strict_dates)?;

    let mut signer = Signer::try_new(key, algorithm, header_list, dates)?;
    signer.set_strict_dates(strict_dates);
    if let Some(name) = &self.digest_hash_algorithm {
      signer.set_digest_hash_algorithm(name)?;
    }
    Ok(signer)
  }

  /// Resolve the configured offsets to dates
  pub fn signature_dates(&self, strict: bool) -> HttpSigResult<SignatureDates> {
    let created = SignatureDates::offset(&self.created, None)?;
    let expires = SignatureDates::offset(&self.expires, created)?;
    let dates = SignatureDates::new(created, expires);
    if strict {
      dates.validate_for_signing()?;
    }
    Ok(dates)
  }

  pub fn sign<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    self.signer(true)?.sign(message)
  }

  pub fn authorize<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    self.signer(true)?.authorize(message)
  }

  pub fn sign_with_digest<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    self.signer(true)?.sign_with_digest(message)
  }

  pub fn authorize_with_digest<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    self.signer(true)?.authorize_with_digest(message)
  }

  /// Verifier over the same key store
  pub fn verifier(&self) -> Verifier<Arc<KeyStore>> {
    Verifier::new(self.key_store.clone())
  }

  /// Explicit signing key, or the only key of the store
  fn signing_key(&self) -> HttpSigResult<Arc<CryptoKey>> {
    match &self.signing_key_id {
      Some(id) => self.key_store.fetch(Some(id)),
      None if self.key_store.count()? == 1 => self.key_store.fetch(None),
      None => Err(HttpSigError::ContextError(
        "No implicit or specified signing key".to_string(),
      )),
    }
  }
}
