use crate::{
  algorithm::{Algorithm, HS2019},
  error::{HttpSigError, HttpSigResult},
  header_list::{HeaderList, CREATED, EXPIRES},
  signature_dates::SignatureDates,
};
use tracing::debug;
use base64::{engine::general_purpose, Engine as _};
use indexmap::IndexMap;

const KEY_ID: &str = "keyId";
const ALGORITHM: &str = "algorithm";
const CREATED_PARAM: &str = "created";
const EXPIRES_PARAM: &str = "expires";
const HEADERS: &str = "headers";
const SIGNATURE: &str = "signature";

/// Parameters with a quoted string value
const QUOTED_PARAMS: &[&str] = &[KEY_ID, ALGORITHM, HEADERS, SIGNATURE];
/// Parameters with a bare integer value
const INTEGER_PARAMS: &[&str] = &[CREATED_PARAM, EXPIRES_PARAM];
/// Parameters every signature must carry
const MANDATORY_PARAMS: &[&str] = &[KEY_ID, ALGORITHM, SIGNATURE];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Value of a signature parameter
pub enum ParameterValue {
  Quoted(String),
  Integer(u64),
}

impl ParameterValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      ParameterValue::Quoted(v) => Some(v),
      ParameterValue::Integer(_) => None,
    }
  }

  pub fn as_int(&self) -> Option<u64> {
    match self {
      ParameterValue::Integer(v) => Some(*v),
      ParameterValue::Quoted(_) => None,
    }
  }
}

/* ---------------------------------------- */
#[derive(Debug, Clone)]
/// Signature parameters of a completed signature, serialized as
/// `keyId="..",algorithm="..",[created=..,][expires=..,][headers="..",]signature=".."`
pub struct SignatureParameters {
  components: Vec<(&'static str, ParameterValue)>,
}

impl SignatureParameters {
  pub fn try_new(
    key_id: &str,
    algorithm: &Algorithm,
    header_list: &HeaderList,
    signature: &[u8],
    dates: &SignatureDates,
  ) -> HttpSigResult<Self> {
    if key_id.is_empty() || key_id.contains(['"', ',']) {
      return Err(HttpSigError::KeyError(format!(
        "Key id '{key_id}' cannot be carried in signature parameters"
      )));
    }
    let mut components = vec![
      (KEY_ID, ParameterValue::Quoted(key_id.to_string())),
      (ALGORITHM, ParameterValue::Quoted(algorithm.name())),
    ];
    if algorithm.is_hs2019() {
      if let Some(created) = dates.created().filter(|_| header_list.contains(CREATED)) {
        components.push((CREATED_PARAM, ParameterValue::Integer(created)));
      }
      if let Some(expires) = dates.expires().filter(|_| header_list.contains(EXPIRES)) {
        components.push((EXPIRES_PARAM, ParameterValue::Integer(expires)));
      }
    }
    if header_list.is_explicit() {
      components.push((HEADERS, ParameterValue::Quoted(header_list.to_string())));
    }
    components.push((SIGNATURE, ParameterValue::Quoted(general_purpose::STANDARD.encode(signature))));
    Ok(Self { components })
  }
}

impl std::fmt::Display for SignatureParameters {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let joined = self
      .components
      .iter()
      .map(|(name, value)| match value {
        ParameterValue::Quoted(v) => format!("{name}=\"{v}\""),
        ParameterValue::Integer(v) => format!("{name}={v}"),
      })
      .collect::<Vec<_>>()
      .join(",");
    write!(f, "{}", joined)
  }
}

/* ---------------------------------------- */
/// Parser of the signature parameter grammar
pub struct SignatureParametersParser<'a> {
  input: &'a str,
}

impl<'a> SignatureParametersParser<'a> {
  pub fn new(input: &'a str) -> Self {
    Self { input }
  }

  /// Parse all segments and check that the mandatory parameters are present
  pub fn parse(&self) -> HttpSigResult<ParsedSignatureParameters> {
    let mut params = IndexMap::new();
    for segment in self.input.split(',') {
      let (name, value) = pair(segment)?;
      if params.insert(name.to_string(), value).is_some() {
        return Err(HttpSigError::SignatureParseError(format!(
          "Duplicate signature parameter '{name}'"
        )));
      }
    }

    let missing = MANDATORY_PARAMS
      .iter()
      .filter(|k| !params.contains_key(**k))
      .copied()
      .collect::<Vec<_>>();
    if !missing.is_empty() {
      return Err(HttpSigError::SignatureParseError(format!("Missing keys {}", missing.join(", "))));
    }
    Ok(ParsedSignatureParameters { params })
  }
}

/// One `name="value"` or `name=integer` segment
fn pair(segment: &str) -> HttpSigResult<(&str, ParameterValue)> {
  let invalid = || HttpSigError::SignatureParseError(format!("Signature parameters segment '{segment}' invalid"));
  let (name, raw) = segment.split_once('=').ok_or_else(invalid)?;

  if QUOTED_PARAMS.contains(&name) {
    let value = raw
      .strip_prefix('"')
      .and_then(|v| v.strip_suffix('"'))
      .ok_or_else(invalid)?;
    return Ok((name, ParameterValue::Quoted(value.to_string())));
  }
  if INTEGER_PARAMS.contains(&name) {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
      return Err(invalid());
    }
    let value = raw.parse::<u64>().map_err(|_| invalid())?;
    return Ok((name, ParameterValue::Integer(value)));
  }
  debug!("Unknown signature parameter '{name}'");
  Err(invalid())
}

/* ---------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Parsed signature parameters, mandatory keys guaranteed present
pub struct ParsedSignatureParameters {
  params: IndexMap<String, ParameterValue>,
}

impl ParsedSignatureParameters {
  /// All parameters in the order they were received
  pub fn as_map(&self) -> &IndexMap<String, ParameterValue> {
    &self.params
  }

  pub fn get(&self, name: &str) -> Option<&ParameterValue> {
    self.params.get(name)
  }

  pub fn key_id(&self) -> &str {
    self.quoted(KEY_ID).unwrap_or_default()
  }

  pub fn algorithm(&self) -> &str {
    self.quoted(ALGORITHM).unwrap_or_default()
  }

  pub fn signature(&self) -> &str {
    self.quoted(SIGNATURE).unwrap_or_default()
  }

  pub fn headers(&self) -> Option<&str> {
    self.quoted(HEADERS)
  }

  pub fn created(&self) -> Option<u64> {
    self.params.get(CREATED_PARAM).and_then(|v| v.as_int())
  }

  pub fn expires(&self) -> Option<u64> {
    self.params.get(EXPIRES_PARAM).and_then(|v| v.as_int())
  }

  /// Base64 decoded signature
  pub fn signature_bytes(&self) -> HttpSigResult<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(self.signature())?)
  }

  /// Covered headers. When the parameter is absent: `(created)` for `hs2019` signatures carrying a created date,
  /// `date` otherwise.
  pub fn header_list(&self) -> HttpSigResult<HeaderList> {
    match self.headers() {
      Some(headers) => HeaderList::from_string(headers),
      None => Ok(HeaderList::implicit_default(
        self.algorithm() == HS2019 && self.created().is_some(),
      )),
    }
  }

  /// Dates carried by the parameters
  pub fn dates(&self) -> SignatureDates {
    SignatureDates::new(self.created(), self.expires())
  }

  fn quoted(&self, name: &str) -> Option<&str> {
    self.params.get(name).and_then(|v| v.as_str())
  }
}
