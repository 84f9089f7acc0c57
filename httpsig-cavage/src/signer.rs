use crate::{
  algorithm::{Algorithm, Family},
  body_digest::BodyDigest,
  error::{HttpSigError, HttpSigResult},
  header_list::{HeaderList, CREATED, EXPIRES},
  key::CryptoKey,
  message::HttpMessage,
  signature_dates::SignatureDates,
  signature_params::SignatureParameters,
  signing_string::SigningString,
};
use tracing::debug;
use std::sync::Arc;

/// Header carrying the signature parameters
pub const SIGNATURE_HEADER: &str = "Signature";
/// Header carrying `Signature <params>` as an authorization scheme
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Authorization scheme token
pub const SIGNATURE_SCHEME: &str = "Signature";

#[derive(Debug, Clone)]
/// Signs messages with one key, algorithm, header list and set of dates
pub struct Signer {
  key: Arc<CryptoKey>,
  algorithm: Algorithm,
  header_list: HeaderList,
  dates: SignatureDates,
  digest: BodyDigest,
  /// Refuse to sign when `created` lies in the future or `expires` in the past
  strict_dates: bool,
}

impl Signer {
  /// Build a signer. The algorithm family must match the key, and `(created)` / `(expires)`
  /// may only be covered by `hs2019` signatures since only they carry the dates.
  pub fn try_new(
    key: Arc<CryptoKey>,
    algorithm: Algorithm,
    header_list: HeaderList,
    dates: SignatureDates,
  ) -> HttpSigResult<Self> {
    let key_family = Family::of_key(&key);
    if algorithm.family() != key_family {
      return Err(HttpSigError::AlgorithmError(format!(
        "Algorithm '{algorithm}' cannot be used with key type '{key_family}'"
      )));
    }
    if !algorithm.is_hs2019() {
      if let Some(name) = [CREATED, EXPIRES].into_iter().find(|n| header_list.contains(n)) {
        return Err(HttpSigError::HeaderError(format!(
          "Special header '{name}' requires the hs2019 algorithm"
        )));
      }
    }
    Ok(Self {
      key,
      algorithm,
      header_list,
      dates,
      digest: BodyDigest::default(),
      strict_dates: true,
    })
  }

  pub fn key(&self) -> &CryptoKey {
    &self.key
  }

  pub fn algorithm(&self) -> &Algorithm {
    &self.algorithm
  }

  pub fn header_list(&self) -> &HeaderList {
    &self.header_list
  }

  pub fn dates(&self) -> &SignatureDates {
    &self.dates
  }

  /// Enable or disable the date window check at signing time
  pub fn set_strict_dates(&mut self, strict: bool) -> &mut Self {
    self.strict_dates = strict;
    self
  }

  /// Hash used by the `*_with_digest` operations, sha256 if never set
  pub fn set_digest_hash_algorithm(&mut self, name: &str) -> HttpSigResult<&mut Self> {
    self.digest = BodyDigest::from_hash_name(Some(name))?;
    Ok(self)
  }

  /// Append a `Signature` header
  pub fn sign<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    let params = self.signature_parameters(&message)?;
    message.with_added_header(SIGNATURE_HEADER, &params.to_string())
  }

  /// Append an `Authorization: Signature ...` header
  pub fn authorize<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    let params = self.signature_parameters(&message)?;
    message.with_added_header(AUTHORIZATION_HEADER, &format!("{SIGNATURE_SCHEME} {params}"))
  }

  /// Set the `Digest` header from the body, cover it, then sign
  pub fn sign_with_digest<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    let (signer, message) = self.with_digest(message)?;
    signer.sign(message)
  }

  /// Set the `Digest` header from the body, cover it, then authorize
  pub fn authorize_with_digest<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    let (signer, message) = self.with_digest(message)?;
    signer.authorize(message)
  }

  /// Signing string this signer would sign for `message`
  pub fn signing_string<M: HttpMessage>(&self, message: &M) -> HttpSigResult<SigningString> {
    SigningString::try_new(&self.header_list, message, &self.dates)
  }

  fn with_digest<M: HttpMessage>(&self, message: M) -> HttpSigResult<(Self, M)> {
    let header_list = self.digest.put_digest_in_header_list(self.header_list.clone())?;
    let message = self.digest.set_digest_header(message)?;
    let signer = Self {
      header_list,
      ..self.clone()
    };
    Ok((signer, message))
  }

  fn signature_parameters<M: HttpMessage>(&self, message: &M) -> HttpSigResult<SignatureParameters> {
    if self.strict_dates {
      self.dates.validate_for_signing()?;
    }
    let signing_string = self.signing_string(message)?;
    let signature = self
      .algorithm
      .sign(&self.key, &signing_string.as_bytes(), self.key.hash_algorithm())?;
    debug!(
      "Signed [{}] with key '{}' using {}",
      self.header_list,
      self.key.id(),
      self.algorithm
    );
    SignatureParameters::try_new(self.key.id(), &self.algorithm, &self.header_list, &signature, &self.dates)
  }
}
