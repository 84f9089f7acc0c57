use crate::{
  body_digest::{BodyDigest, DIGEST_HEADER},
  crypto::HashAlgorithm,
  error::{HttpSigError, HttpSigResult},
  key_store::KeyResolver,
  message::HttpMessage,
  verification::{SignatureHeaderKind, Verification, VerificationPolicy},
};
use tracing::{debug, error};
use base64::{engine::general_purpose, Engine as _};

/// Verifies signatures and digests of incoming messages.
///
/// Each check returns a boolean and records a diagnostic trail readable through [`Verifier::status`].
/// Errors meaning "not validly signed" become `false`, integration faults propagate.
pub struct Verifier<K: KeyResolver> {
  key_store: K,
  policy: VerificationPolicy,
  status: Vec<String>,
}

impl<K: KeyResolver> Verifier<K> {
  pub fn new(key_store: K) -> Self {
    Self {
      key_store,
      policy: VerificationPolicy::default(),
      status: vec![],
    }
  }

  pub fn key_store(&self) -> &K {
    &self.key_store
  }

  /// Diagnostics of the latest check
  pub fn status(&self) -> &[String] {
    &self.status
  }

  /// Only accept signatures whose effective digest is one of `digests`
  pub fn set_accepted_digests(&mut self, digests: &[HashAlgorithm]) -> &mut Self {
    self.policy.accepted_digests = Some(digests.to_vec());
    self
  }

  /// Reject signatures whose `created` lies in the future or whose `expires` lies in the past
  pub fn set_enforce_dates(&mut self, created_drift: u64, expires_drift: u64) -> &mut Self {
    self.policy.enforced_dates = Some((created_drift, expires_drift));
    self
  }

  /// Whether the message carries exactly one valid `Signature` header
  pub fn is_signed<M: HttpMessage>(&mut self, message: &M) -> HttpSigResult<bool> {
    self.check(message, SignatureHeaderKind::Signature)
  }

  /// Whether the message carries exactly one valid `Authorization: Signature` header
  pub fn is_authorized<M: HttpMessage>(&mut self, message: &M) -> HttpSigResult<bool> {
    self.check(message, SignatureHeaderKind::Authorization)
  }

  /// Whether the `Digest` header exists and matches the body
  pub fn is_valid_digest<M: HttpMessage>(&mut self, message: &M) -> bool {
    self.status.clear();
    if !message.has_header(DIGEST_HEADER) {
      self.status.push("Digest header missing".to_string());
      return false;
    }
    let digest = match BodyDigest::from_message(message) {
      Ok(digest) => digest,
      Err(e) => {
        self.status.push(match e {
          HttpSigError::DigestError(m) => m,
          e => e.to_string(),
        });
        return false;
      }
    };
    let valid = digest.is_valid(message);
    if !valid {
      self.status.push("Digest header invalid".to_string());
    }
    valid
  }

  /// Valid digest and valid `Signature` header
  pub fn is_signed_with_digest<M: HttpMessage>(&mut self, message: &M) -> HttpSigResult<bool> {
    if !self.is_valid_digest(message) {
      return Ok(false);
    }
    self.is_signed(message)
  }

  /// Valid digest and valid `Authorization: Signature` header
  pub fn is_authorized_with_digest<M: HttpMessage>(&mut self, message: &M) -> HttpSigResult<bool> {
    if !self.is_valid_digest(message) {
      return Ok(false);
    }
    self.is_authorized(message)
  }

  fn check<M: HttpMessage>(&mut self, message: &M, kind: SignatureHeaderKind) -> HttpSigResult<bool> {
    self.status.clear();
    match self.verify(message, kind) {
      Ok((result, signing_string)) => {
        self.status.push(format!(
          "Message SigningString: '{}'",
          general_purpose::STANDARD.encode(signing_string)
        ));
        Ok(result)
      }
      Err(e) if e.is_verification_failure() => {
        debug!("{kind} verification failed: {e}");
        let entry = match e {
          HttpSigError::HeaderError(_) => format!("{kind} header not found"),
          HttpSigError::SignatureParseError(_) => format!("{kind} header malformed"),
          e => e.to_string(),
        };
        self.status.push(entry);
        Ok(false)
      }
      Err(e) => {
        error!("Unexpected error while verifying {kind} header: {e}");
        self.status.push(format!("Unknown exception: {e}"));
        Err(e)
      }
    }
  }

  fn verify<M: HttpMessage>(&self, message: &M, kind: SignatureHeaderKind) -> HttpSigResult<(bool, Vec<u8>)> {
    let verification = Verification::try_new(message, kind)?;
    let result = verification.verify(&self.key_store, &self.policy)?;
    let signing_string = verification.signing_string()?;
    Ok((result, signing_string.as_bytes()))
  }
}
