use crate::{
  error::{HttpSigError, HttpSigResult},
  key::CryptoKey,
  util::has_unique_elements,
};
use tracing::debug;
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// Resolves the key referenced by the `keyId` signature parameter
pub trait KeyResolver {
  /// Fetch a key by id. Without an id, the sole registered key is returned.
  fn fetch(&self, key_id: Option<&str>) -> HttpSigResult<Arc<CryptoKey>>;
}

/* ----------------------------------------------------------------- */
#[derive(Default)]
/// Registry of keys by id. Entries are only ever added.
pub struct KeyStore {
  keys: RwLock<FxHashMap<String, Arc<CryptoKey>>>,
}

impl KeyStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a store holding the given keys
  pub fn try_new(keys: Vec<CryptoKey>) -> HttpSigResult<Self> {
    let store = Self::new();
    store.add_keys(keys)?;
    Ok(store)
  }

  /// Create a store from `(key id, credential blobs)` entries
  pub fn from_blobs(entries: &[(&str, &[&str])]) -> HttpSigResult<Self> {
    let keys = entries
      .iter()
      .map(|(id, blobs)| CryptoKey::try_new(id, blobs))
      .collect::<HttpSigResult<Vec<_>>>()?;
    Self::try_new(keys)
  }

  /// Add keys. Either all keys are added or, on a duplicate id, none is.
  pub fn add_keys(&self, keys: Vec<CryptoKey>) -> HttpSigResult<()> {
    let mut map = self
      .keys
      .write()
      .map_err(|_| HttpSigError::KeyStoreError("Key store lock poisoned".to_string()))?;

    if !has_unique_elements(keys.iter().map(|k| k.id())) {
      return Err(HttpSigError::KeyStoreError("Duplicate key ids in added keys".to_string()));
    }
    if let Some(dup) = keys.iter().find(|k| map.contains_key(k.id())) {
      return Err(HttpSigError::KeyStoreError(format!("Key id '{}' already registered", dup.id())));
    }
    for key in keys {
      debug!("Register key '{}'", key.id());
      map.insert(key.id().to_string(), Arc::new(key));
    }
    Ok(())
  }

  /// Number of registered keys
  pub fn count(&self) -> HttpSigResult<usize> {
    Ok(self.read_keys()?.len())
  }

  /// Registered key ids, unordered
  pub fn key_ids(&self) -> HttpSigResult<Vec<String>> {
    Ok(self.read_keys()?.keys().cloned().collect())
  }

  fn read_keys(&self) -> HttpSigResult<RwLockReadGuard<'_, FxHashMap<String, Arc<CryptoKey>>>> {
    self
      .keys
      .read()
      .map_err(|_| HttpSigError::KeyStoreError("Key store lock poisoned".to_string()))
  }
}

impl KeyResolver for KeyStore {
  fn fetch(&self, key_id: Option<&str>) -> HttpSigResult<Arc<CryptoKey>> {
    let map = self.read_keys()?;
    match key_id {
      Some(id) => map
        .get(id)
        .cloned()
        .ok_or_else(|| HttpSigError::KeyStoreError(format!("Cannot locate key for supplied keyId '{id}'"))),
      None if map.len() == 1 => map
        .values()
        .next()
        .cloned()
        .ok_or_else(|| HttpSigError::KeyStoreError("Key store is empty".to_string())),
      None => Err(HttpSigError::KeyStoreError(format!(
        "No key id given and the store holds {} keys",
        map.len()
      ))),
    }
  }
}

impl<K: KeyResolver + ?Sized> KeyResolver for Arc<K> {
  fn fetch(&self, key_id: Option<&str>) -> HttpSigResult<Arc<CryptoKey>> {
    (**self).fetch(key_id)
  }
}

impl std::fmt::Debug for KeyStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("KeyStore").field("key_ids", &self.key_ids()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_keys::*;

  #[test]
  fn fetch_by_id_and_sole_default() {
    let store = KeyStore::from_blobs(&[("rsa", &[RSA_PRIVATE_KEY])]).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.fetch(Some("rsa")).unwrap().id(), "rsa");
    assert_eq!(store.fetch(None).unwrap().id(), "rsa");
    assert!(matches!(store.fetch(Some("nope")), Err(HttpSigError::KeyStoreError(_))));
  }

  #[test]
  fn no_default_with_several_keys() {
    let store = KeyStore::from_blobs(&[("rsa", &[RSA_PRIVATE_KEY]), ("hmac", &[HMAC_SECRET])]).unwrap();
    assert_eq!(store.count().unwrap(), 2);
    assert!(matches!(store.fetch(None), Err(HttpSigError::KeyStoreError(_))));
    assert!(matches!(KeyStore::new().fetch(None), Err(HttpSigError::KeyStoreError(_))));
  }

  #[test]
  fn duplicate_ids_are_rejected_atomically() {
    let store = KeyStore::from_blobs(&[("a", &[HMAC_SECRET])]).unwrap();
    let res = store.add_keys(vec![CryptoKey::from_secret("b", b"x"), CryptoKey::from_secret("a", b"y")]);
    assert!(matches!(res, Err(HttpSigError::KeyStoreError(_))));
    assert_eq!(store.count().unwrap(), 1);

    let res = store.add_keys(vec![CryptoKey::from_secret("c", b"x"), CryptoKey::from_secret("c", b"x")]);
    assert!(matches!(res, Err(HttpSigError::KeyStoreError(_))));
    assert_eq!(store.count().unwrap(), 1);

    store.add_keys(vec![CryptoKey::from_secret("b", b"x")]).unwrap();
    let mut ids = store.key_ids().unwrap();
    ids.sort();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
  }

  #[test]
  fn shared_across_threads() {
    let store = Arc::new(KeyStore::from_blobs(&[("hmac", &[HMAC_SECRET])]).unwrap());
    let handles = (0..4)
      .map(|i| {
        let store = store.clone();
        std::thread::spawn(move || {
          store.add_keys(vec![CryptoKey::from_secret(&format!("k{i}"), b"s")]).unwrap();
          store.fetch(Some("hmac")).unwrap().id().to_string()
        })
      })
      .collect::<Vec<_>>();
    for h in handles {
      assert_eq!(h.join().unwrap(), "hmac");
    }
    assert_eq!(store.count().unwrap(), 5);
  }

  #[test]
  fn poisoned_lock_is_reported() {
    let store = KeyStore::from_blobs(&[("hmac", &[HMAC_SECRET])]).unwrap();
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
      let _guard = store.keys.write().unwrap();
      panic!("poison the key store");
    }));
    assert!(res.is_err());

    assert!(matches!(store.count(), Err(HttpSigError::KeyStoreError(_))));
    assert!(matches!(store.key_ids(), Err(HttpSigError::KeyStoreError(_))));
    assert!(matches!(store.fetch(None), Err(HttpSigError::KeyStoreError(_))));

    let context = crate::context::Context::new(store);
    assert!(matches!(context.signer(true), Err(HttpSigError::KeyStoreError(_))));
  }
}
