use crate::{
  crypto::HashAlgorithm,
  error::{HttpSigError, HttpSigResult},
  header_list::HeaderList,
  message::HttpMessage,
};
use tracing::debug;
use base64::{engine::general_purpose, Engine as _};
use subtle::ConstantTimeEq;

/// Digest header name
pub const DIGEST_HEADER: &str = "digest";

const VALID_HASHES: &[&str] = &["sha", "sha1", "sha256", "sha512"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Body digest carried in the `Digest` header as `<PREFIX>=<base64 hash>`
pub struct BodyDigest {
  hash: HashAlgorithm,
}

impl Default for BodyDigest {
  fn default() -> Self {
    Self {
      hash: HashAlgorithm::Sha256,
    }
  }
}

impl BodyDigest {
  /// Digest for a hash name such as `sha256`, `SHA-256` or `sha`. `None` or an empty name means sha256.
  pub fn from_hash_name(name: Option<&str>) -> HttpSigResult<Self> {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
      return Ok(Self::default());
    };
    let hash = match normalize(name).as_str() {
      "sha" | "sha1" => HashAlgorithm::Sha1,
      "sha256" => HashAlgorithm::Sha256,
      "sha512" => HashAlgorithm::Sha512,
      _ => {
        return Err(HttpSigError::DigestError(format!(
          "'{name}' is not a valid Digest algorithm specifier"
        )))
      }
    };
    Ok(Self { hash })
  }

  /// Whether `spec` names a supported digest, ignoring case and dashes
  pub fn is_valid_digest_spec(spec: &str) -> bool {
    VALID_HASHES.contains(&normalize(spec).as_str())
  }

  /// Digest configured from the prefix of a `Digest` header value
  pub fn from_header_value(value: &str) -> HttpSigResult<Self> {
    let Some((prefix, _)) = value.split_once('=').filter(|(prefix, _)| !prefix.is_empty()) else {
      return Err(HttpSigError::DigestError(
        "Digest header does not appear to be correctly formatted".to_string(),
      ));
    };
    if !Self::is_valid_digest_spec(prefix) {
      return Err(HttpSigError::DigestError(format!(
        "'{prefix}' in Digest header is not a valid algorithm"
      )));
    }
    Self::from_hash_name(Some(prefix))
  }

  /// Digest configured from the first `Digest` header of `message`
  pub fn from_message<M: HttpMessage>(message: &M) -> HttpSigResult<Self> {
    let values = message.header_values(DIGEST_HEADER)?;
    let first = values
      .first()
      .ok_or_else(|| HttpSigError::DigestError("No Digest header in message".to_string()))?;
    Self::from_header_value(first)
  }

  pub fn hash(&self) -> HashAlgorithm {
    self.hash
  }

  /// Textual prefix of the header value
  pub fn prefix(&self) -> &'static str {
    match self.hash {
      HashAlgorithm::Sha1 => "SHA",
      HashAlgorithm::Sha256 => "SHA-256",
      HashAlgorithm::Sha384 => "SHA-384",
      HashAlgorithm::Sha512 => "SHA-512",
    }
  }

  /// `<PREFIX>=<base64(hash(body))>`
  pub fn digest_header_value(&self, body: &[u8]) -> String {
    format!("{}={}", self.prefix(), general_purpose::STANDARD.encode(self.hash.hash(body)))
  }

  /// Make sure `digest` is covered by the header list
  pub fn put_digest_in_header_list(&self, header_list: HeaderList) -> HttpSigResult<HeaderList> {
    header_list.with_name(DIGEST_HEADER)
  }

  /// Replace any `Digest` header with the digest of the current body
  pub fn set_digest_header<M: HttpMessage>(&self, message: M) -> HttpSigResult<M> {
    let value = self.digest_header_value(message.body());
    message.with_header("Digest", &value)
  }

  /// Compare the first `Digest` header with the digest of the body. Never fails, a missing header is invalid.
  pub fn is_valid<M: HttpMessage>(&self, message: &M) -> bool {
    let received = match message.header_values(DIGEST_HEADER) {
      Ok(values) => values.into_iter().next(),
      Err(e) => {
        debug!("Cannot read Digest header: {e}");
        None
      }
    };
    let Some(received) = received else {
      return false;
    };
    let expected = self.digest_header_value(message.body());
    received.as_bytes().ct_eq(expected.as_bytes()).into()
  }
}

fn normalize(spec: &str) -> String {
  spec.replace('-', "").to_ascii_lowercase()
}
