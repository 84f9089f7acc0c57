use crate::error::HttpSigResult;

/// Http message as seen by the signer and the verifier.
///
/// Header lookups are case-insensitive and keep the order in which header lines occur.
/// Mutations consume the message and return the new value, the core never edits a borrowed message.
pub trait HttpMessage: Sized {
  /// Lower or upper case http method, `None` for responses
  fn method(&self) -> Option<String>;

  /// Path and query of the request, `None` for responses
  fn request_target(&self) -> Option<String>;

  /// All values of the header `name` in occurrence order
  fn header_values(&self, name: &str) -> HttpSigResult<Vec<String>>;

  /// Whether at least one header `name` exists
  fn has_header(&self, name: &str) -> bool;

  /// Append a header line, keeping existing ones
  fn with_added_header(self, name: &str, value: &str) -> HttpSigResult<Self>;

  /// Remove every header line `name`
  fn without_header(self, name: &str) -> Self;

  /// Replace every header line `name` with a single one
  fn with_header(self, name: &str, value: &str) -> HttpSigResult<Self> {
    self.without_header(name).with_added_header(name, value)
  }

  /// Message body
  fn body(&self) -> &[u8];
}

/* ----------------------------------------------------------------- */
