use rand::Rng;
use tracing::debug;

use crate::config::HostConfig;
use crate::error::Result;
use crate::store::KeyValueStore;

/// Stable identifier for this host, created on first use.
///
/// A stored value of the wrong length is replaced.
pub fn host_id(store: &mut dyn KeyValueStore, config: &HostConfig) -> Result<String> {
    if let Some(existing) = store.get(&config.host_key)? {
        if existing.len() == config.host_id_len && existing.bytes().all(|b| b.is_ascii_lowercase())
        {
            return Ok(existing);
        }
    }

    let generated = generate(config.host_id_len);
    store.set(&config.host_key, &generated)?;
    debug!(key = %config.host_key, "generated host id");
    Ok(generated)
}

fn generate(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(rng.random_range(b'a'..=b'z')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn generates_and_persists() {
        let mut store = MemoryStore::new();
        let config = HostConfig::default();

        let first = host_id(&mut store, &config).unwrap();
        let second = host_id(&mut store, &config).unwrap();

        assert_eq!(first.len(), 15);
        assert!(first.bytes().all(|b| b.is_ascii_lowercase()));
        assert_eq!(first, second);
        assert_eq!(store.get(&config.host_key).unwrap(), Some(first));
    }

    #[test]
    fn replaces_malformed_value() {
        let mut store = MemoryStore::new();
        let config = HostConfig::default();
        store.set(&config.host_key, "short").unwrap();

        let id = host_id(&mut store, &config).unwrap();

        assert_ne!(id, "short");
        assert_eq!(id.len(), config.host_id_len);
    }
}
