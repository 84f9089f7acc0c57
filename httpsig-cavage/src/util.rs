use crate::error::{HttpSigError, HttpSigResult};
use std::time::{SystemTime, UNIX_EPOCH};

/// Check duplicate elements in a vector
pub(crate) fn has_unique_elements<T>(iter: T) -> bool
where
  T: IntoIterator,
  T::Item: Eq + std::hash::Hash,
{
  let mut uniq = rustc_hash::FxHashSet::default();
  iter.into_iter().all(move |x| uniq.insert(x))
}

/// Current unix timestamp in seconds
pub(crate) fn unix_now() -> HttpSigResult<u64> {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs())
    .map_err(|e| HttpSigError::SignatureDatesError(format!("System clock before unix epoch: {e}")))
}
