use crate::{
  error::{HttpSigError, HttpSigResult},
  util::has_unique_elements,
};

/// Pseudo-header carrying the request method and target
pub const REQUEST_TARGET: &str = "(request-target)";
/// Pseudo-header carrying the `created` timestamp
pub const CREATED: &str = "(created)";
/// Pseudo-header carrying the `expires` timestamp
pub const EXPIRES: &str = "(expires)";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ordered, lower-cased header and pseudo-header names covered by a signature.
/// The order is the line order of the signing string.
pub struct HeaderList {
  names: Vec<String>,
  /// Whether the names are serialized as the `headers` parameter
  explicit: bool,
}

impl HeaderList {
  /// Explicit list of names
  pub fn try_new<T: AsRef<str>>(names: &[T]) -> HttpSigResult<Self> {
    let names = names.iter().map(|n| n.as_ref().to_ascii_lowercase()).collect::<Vec<_>>();
    if names.is_empty() {
      return Err(HttpSigError::HeaderError("Empty header list".to_string()));
    }
    if let Some(bad) = names.iter().find(|n| !is_valid_name(n)) {
      return Err(HttpSigError::HeaderError(format!("Invalid header name '{bad}'")));
    }
    if !has_unique_elements(names.iter()) {
      return Err(HttpSigError::HeaderError("Duplicate header names".to_string()));
    }
    Ok(Self { names, explicit: true })
  }

  /// Parse the space separated `headers` parameter
  pub fn from_string(value: &str) -> HttpSigResult<Self> {
    Self::try_new(&value.split(' ').filter(|n| !n.is_empty()).collect::<Vec<_>>())
  }

  /// The single implicit default list: `(created)` for hs2019, `date` otherwise.
  /// It is not serialized into the signature parameters.
  pub fn implicit_default(hs2019: bool) -> Self {
    let name = if hs2019 { CREATED } else { "date" };
    Self {
      names: vec![name.to_string()],
      explicit: false,
    }
  }

  /// Append `name` unless already present. The result is always explicit.
  pub fn with_name(mut self, name: &str) -> HttpSigResult<Self> {
    let name = name.to_ascii_lowercase();
    if !is_valid_name(&name) {
      return Err(HttpSigError::HeaderError(format!("Invalid header name '{name}'")));
    }
    if !self.contains(&name) {
      self.names.push(name);
    }
    self.explicit = true;
    Ok(self)
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
  }

  pub fn is_explicit(&self) -> bool {
    self.explicit
  }
}

impl std::fmt::Display for HeaderList {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.names.join(" "))
  }
}

fn is_valid_name(name: &str) -> bool {
  !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == ',')
}
