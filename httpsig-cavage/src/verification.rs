use crate::{
  algorithm::Algorithm,
  crypto::HashAlgorithm,
  error::{HttpSigError, HttpSigResult},
  key_store::KeyResolver,
  message::HttpMessage,
  signature_params::{ParsedSignatureParameters, SignatureParametersParser},
  signer::{AUTHORIZATION_HEADER, SIGNATURE_HEADER, SIGNATURE_SCHEME},
  signing_string::SigningString,
  util::unix_now,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Header a signature is read from
pub enum SignatureHeaderKind {
  /// `Signature: <params>`
  Signature,
  /// `Authorization: Signature <params>`
  Authorization,
}

impl SignatureHeaderKind {
  pub fn header_name(&self) -> &'static str {
    match self {
      SignatureHeaderKind::Signature => SIGNATURE_HEADER,
      SignatureHeaderKind::Authorization => AUTHORIZATION_HEADER,
    }
  }
}

impl std::fmt::Display for SignatureHeaderKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.header_name())
  }
}

/* ----------------------------------------------------------------- */
#[derive(Debug, Clone, Default)]
/// Extra restrictions applied on top of the cryptographic check
pub struct VerificationPolicy {
  /// Effective digests a signature may use, any when `None`
  pub accepted_digests: Option<Vec<HashAlgorithm>>,
  /// `(created drift, expires drift)` when received dates are enforced
  pub enforced_dates: Option<(u64, u64)>,
}

/* ----------------------------------------------------------------- */
/// A single attempt at verifying the signature carried by a message
pub struct Verification<'a, M: HttpMessage> {
  message: &'a M,
  parameters: ParsedSignatureParameters,
}

impl<'a, M: HttpMessage> Verification<'a, M> {
  /// Locate exactly one signature line of the given kind and parse its parameters
  pub fn try_new(message: &'a M, kind: SignatureHeaderKind) -> HttpSigResult<Self> {
    let line = signature_line(message, kind)?;
    let parameters = SignatureParametersParser::new(&line).parse()?;
    Ok(Self { message, parameters })
  }

  pub fn parameters(&self) -> &ParsedSignatureParameters {
    &self.parameters
  }

  /// Verify the signature against the key it names
  pub fn verify<K: KeyResolver + ?Sized>(&self, key_store: &K, policy: &VerificationPolicy) -> HttpSigResult<bool> {
    let key_id = self.parameters.key_id();
    let key = key_store.fetch(Some(key_id))?;
    let algorithm = Algorithm::resolve(self.parameters.algorithm(), &key)?;
    let hash = algorithm.effective_hash(key.hash_algorithm());

    if let Some(accepted) = &policy.accepted_digests {
      if !accepted.contains(&hash) {
        return Err(HttpSigError::AlgorithmError(format!(
          "Digest '{hash}' is not accepted for verification"
        )));
      }
    }
    if let Some((created_drift, expires_drift)) = policy.enforced_dates {
      let mut dates = self.parameters.dates();
      dates.set_created_drift(created_drift).set_expires_drift(expires_drift);
      dates.validate_at(unix_now()?)?;
    }

    let signing_string = self.signing_string()?;
    let signature = self.parameters.signature_bytes()?;
    let result = algorithm.verify(&signing_string.as_bytes(), &signature, &key, key.hash_algorithm())?;
    if !result {
      debug!("Signature by key '{key_id}' does not match");
    }
    Ok(result)
  }

  /// Signing string rebuilt from the received parameters
  pub fn signing_string(&self) -> HttpSigResult<SigningString> {
    let header_list = self.parameters.header_list()?;
    SigningString::try_new(&header_list, self.message, &self.parameters.dates())
  }
}

/// The parameters part of the single signature-bearing header
fn signature_line<M: HttpMessage>(message: &M, kind: SignatureHeaderKind) -> HttpSigResult<String> {
  let name = kind.header_name();
  let mut values = message.header_values(name)?;
  if kind == SignatureHeaderKind::Authorization {
    values.retain(|v| v.starts_with(&format!("{SIGNATURE_SCHEME} ")));
  }
  match values.len() {
    0 => Err(HttpSigError::HeaderError(format!("Cannot locate header '{name}'"))),
    1 => {
      let value = values.remove(0);
      match kind {
        SignatureHeaderKind::Signature => Ok(value),
        SignatureHeaderKind::Authorization => Ok(value[SIGNATURE_SCHEME.len() + 1..].to_string()),
      }
    }
    _ => Err(HttpSigError::HeaderError(format!("Multiple headers named '{name}'"))),
  }
}
