use thiserror::Error;

/// Result type for http signature
pub type HttpSigResult<T> = std::result::Result<T, HttpSigError>;

/// Error type for http signature
#[derive(Error, Debug)]
pub enum HttpSigError {
  #[error("Base64 decode error: {0}")]
  Base64DecodeError(#[from] base64::DecodeError),

  /* ----- Crypto errors ----- */
  /// Unsupported digest or algorithm name, or key material unusable for the algorithm
  #[error("Algorithm error: {0}")]
  AlgorithmError(String),
  /// Ambiguous, invalid or conflicting key material
  #[error("Key error: {0}")]
  KeyError(String),
  /// Unknown key id, or duplicate key id on insert
  #[error("Key store error: {0}")]
  KeyStoreError(String),

  /* ----- Message errors ----- */
  /// Missing or duplicate signature-bearing header, unsupported pseudo-header
  #[error("Header error: {0}")]
  HeaderError(String),
  /// A header covered by the signature is absent from the message
  #[error("Header '{0}' not found in message")]
  SignedHeaderNotPresent(String),
  /// Malformed signature parameter grammar
  #[error("Failed to parse signature parameters: {0}")]
  SignatureParseError(String),
  /// Unsupported digest spec or malformed Digest header
  #[error("Digest error: {0}")]
  DigestError(String),
  /// created / expires outside of the accepted window
  #[error("Signature dates error: {0}")]
  SignatureDatesError(String),

  /* ----- Configuration errors ----- */
  #[error("Context error: {0}")]
  ContextError(String),
}

impl HttpSigError {
  /// Whether the error means "this message does not carry a valid signature".
  /// The verifier turns these into `false`, anything else is an integration fault and propagates.
  pub fn is_verification_failure(&self) -> bool {
    matches!(
      self,
      HttpSigError::Base64DecodeError(_)
        | HttpSigError::AlgorithmError(_)
        | HttpSigError::KeyStoreError(_)
        | HttpSigError::HeaderError(_)
        | HttpSigError::SignedHeaderNotPresent(_)
        | HttpSigError::SignatureParseError(_)
        | HttpSigError::SignatureDatesError(_)
    )
  }
}
