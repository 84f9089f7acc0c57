use crate::{
  error::{HttpSigError, HttpSigResult},
  util::unix_now,
};

/// Tolerated skew of `created` into the future, in seconds
pub const DEFAULT_CREATED_DRIFT: u64 = 1;
/// Tolerated lateness after `expires`, in seconds
pub const DEFAULT_EXPIRES_DRIFT: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
/// `created` / `expires` timestamps of a signature with drift tolerances.
/// An unset timestamp is not enforced.
pub struct SignatureDates {
  created: Option<u64>,
  expires: Option<u64>,
  created_drift: u64,
  expires_drift: u64,
}

impl Default for SignatureDates {
  fn default() -> Self {
    Self {
      created: None,
      expires: None,
      created_drift: DEFAULT_CREATED_DRIFT,
      expires_drift: DEFAULT_EXPIRES_DRIFT,
    }
  }
}

impl SignatureDates {
  pub fn new(created: Option<u64>, expires: Option<u64>) -> Self {
    Self {
      created,
      expires,
      ..Default::default()
    }
  }

  /// Resolve an offset expression to a timestamp.
  ///
  /// - `now`: the current time
  /// - `none`: no timestamp
  /// - `+N` / `-N`: N seconds after / before `start` (the current time if `None`)
  /// - `N`: the absolute timestamp N
  pub fn offset(value: &str, start: Option<u64>) -> HttpSigResult<Option<u64>> {
    let value = value.trim();
    match value {
      "now" => return Ok(Some(unix_now()?)),
      "none" => return Ok(None),
      _ => {}
    }
    let start = match start {
      Some(start) => start,
      None => unix_now()?,
    };
    let parse = |v: &str| {
      v.parse::<u64>()
        .map_err(|e| HttpSigError::SignatureDatesError(format!("Invalid offset '{value}': {e}")))
    };
    if let Some(rest) = value.strip_prefix('+') {
      Ok(Some(start.saturating_add(parse(rest)?)))
    } else if let Some(rest) = value.strip_prefix('-') {
      Ok(Some(start.saturating_sub(parse(rest)?)))
    } else {
      Ok(Some(parse(value)?))
    }
  }

  pub fn created(&self) -> Option<u64> {
    self.created
  }

  pub fn expires(&self) -> Option<u64> {
    self.expires
  }

  pub fn created_drift(&self) -> u64 {
    self.created_drift
  }

  pub fn expires_drift(&self) -> u64 {
    self.expires_drift
  }

  pub fn set_created(&mut self, created: u64) -> &mut Self {
    self.created = Some(created);
    self
  }

  pub fn set_expires(&mut self, expires: u64) -> &mut Self {
    self.expires = Some(expires);
    self
  }

  pub fn unset_created(&mut self) -> &mut Self {
    self.created = None;
    self
  }

  pub fn unset_expires(&mut self) -> &mut Self {
    self.expires = None;
    self
  }

  /// Set the same drift for `created` and `expires`
  pub fn set_drift(&mut self, drift: u64) -> &mut Self {
    self.set_created_drift(drift).set_expires_drift(drift)
  }

  pub fn set_created_drift(&mut self, drift: u64) -> &mut Self {
    self.created_drift = drift;
    self
  }

  pub fn set_expires_drift(&mut self, drift: u64) -> &mut Self {
    self.expires_drift = drift;
    self
  }

  /// Whether `created` is not later than `at` plus the created drift
  pub fn has_started_at(&self, at: u64) -> bool {
    self
      .created
      .map_or(true, |created| created <= at.saturating_add(self.created_drift))
  }

  /// Whether `at` is past `expires` plus the expires drift
  pub fn has_expired_at(&self, at: u64) -> bool {
    self
      .expires
      .map_or(false, |expires| at > expires.saturating_add(self.expires_drift))
  }

  pub fn has_started(&self) -> HttpSigResult<bool> {
    Ok(self.has_started_at(unix_now()?))
  }

  pub fn has_expired(&self) -> HttpSigResult<bool> {
    Ok(self.has_expired_at(unix_now()?))
  }

  /// Seconds elapsed since `created`, negative when it lies in the future
  pub fn since_created(&self) -> HttpSigResult<Option<i64>> {
    let now = unix_now()?;
    self.created.map(|created| difference(now, created)).transpose()
  }

  /// Seconds left until `expires`, negative once expired
  pub fn to_expire(&self) -> HttpSigResult<Option<i64>> {
    let now = unix_now()?;
    self.expires.map(|expires| difference(expires, now)).transpose()
  }

  /// Fail unless the dates are valid at `at`
  pub fn validate_at(&self, at: u64) -> HttpSigResult<()> {
    if !self.has_started_at(at) {
      return Err(HttpSigError::SignatureDatesError(format!(
        "'created' is in the future: {at},{}",
        self.created.unwrap_or_default()
      )));
    }
    if self.has_expired_at(at) {
      return Err(HttpSigError::SignatureDatesError(format!(
        "'expires' is in the past: {at},{}",
        self.expires.unwrap_or_default()
      )));
    }
    Ok(())
  }

  /// Fail unless the dates are valid now
  pub fn validate_for_signing(&self) -> HttpSigResult<()> {
    self.validate_at(unix_now()?)
  }
}

/// `a - b` in seconds, as long as it fits an `i64`
fn difference(a: u64, b: u64) -> HttpSigResult<i64> {
  i64::try_from(i128::from(a) - i128::from(b))
    .map_err(|_| HttpSigError::SignatureDatesError(format!("Date difference out of range: {a} - {b}")))
}
