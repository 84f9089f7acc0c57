use crate::{
  error::{HttpSigError, HttpSigResult},
  header_list::{HeaderList, CREATED, EXPIRES, REQUEST_TARGET},
  message::HttpMessage,
  signature_dates::SignatureDates,
};

/// Signing string
/// One `name: value` line per covered header, in header list order, joined by `\n` without a trailing newline.
pub struct SigningString {
  lines: Vec<String>,
}

impl SigningString {
  /// Build the signing string of `message`
  pub fn try_new<M: HttpMessage>(header_list: &HeaderList, message: &M, dates: &SignatureDates) -> HttpSigResult<Self> {
    let lines = header_list
      .names()
      .iter()
      .map(|name| line(name, message, dates))
      .collect::<HttpSigResult<Vec<_>>>()?;
    Ok(Self { lines })
  }

  /// Returns the signing string as bytes to be signed
  pub fn as_bytes(&self) -> Vec<u8> {
    self.to_string().into_bytes()
  }
}

impl std::fmt::Display for SigningString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.lines.join("\n"))
  }
}

fn line<M: HttpMessage>(name: &str, message: &M, dates: &SignatureDates) -> HttpSigResult<String> {
  if name.starts_with('(') && name.ends_with(')') {
    let value = match name {
      REQUEST_TARGET => request_target(message)?,
      CREATED => dates
        .created()
        .ok_or_else(|| HttpSigError::HeaderError(format!("Special header '{name}' requires a created date")))?
        .to_string(),
      EXPIRES => dates
        .expires()
        .ok_or_else(|| HttpSigError::HeaderError(format!("Special header '{name}' requires an expires date")))?
        .to_string(),
      _ => return Err(HttpSigError::HeaderError(format!("Special header '{name}' not understood"))),
    };
    return Ok(format!("{name}: {value}"));
  }

  let values = message.header_values(name)?;
  if values.is_empty() {
    return Err(HttpSigError::SignedHeaderNotPresent(name.to_string()));
  }
  Ok(format!("{}: {}", name.to_ascii_lowercase(), values.join(", ")))
}

fn request_target<M: HttpMessage>(message: &M) -> HttpSigResult<String> {
  match (message.method(), message.request_target()) {
    (Some(method), Some(target)) => Ok(format!("{} {}", method.to_ascii_lowercase(), target)),
    _ => Err(HttpSigError::HeaderError(
      "Special header (request-target) is only allowed for requests".to_string(),
    )),
  }
}
