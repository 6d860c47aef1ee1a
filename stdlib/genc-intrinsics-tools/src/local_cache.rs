use crate::collaborators::CustomFunction;
use arcstr::ArcStr;
use async_trait::async_trait;
use fxhash::FxHashMap;
use genc_value::Value;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe cache that stores a bounded FIFO list of messages per key.
/// Convenient for tests and local development (e.g. giving a chatbot
/// conversation access to recent context); a real deployment should reach
/// for a distributed cache instead.
pub struct LocalCache<V: Clone + Send + Sync> {
    messages: RwLock<FxHashMap<ArcStr, Vec<V>>>,
    max_messages_per_key: usize,
}

impl<V: Clone + Send + Sync> LocalCache<V> {
    pub fn new(max_messages_per_key: usize) -> Self {
        LocalCache { messages: RwLock::new(FxHashMap::default()), max_messages_per_key }
    }

    /// Appends `message` under `key`, pruning the oldest entry first if the
    /// key is already at capacity.
    pub fn put(&self, key: impl Into<ArcStr>, message: V) {
        let mut messages = self.messages.write();
        let slot = messages.entry(key.into()).or_default();
        if slot.len() >= self.max_messages_per_key {
            slot.remove(0);
        }
        slot.push(message);
    }

    /// Returns the messages stored under `key`, oldest first. With `n`,
    /// returns only the most recent `n`; without it, returns everything.
    pub fn get(&self, key: &str, n: Option<usize>) -> Vec<V> {
        let messages = self.messages.read();
        let Some(slot) = messages.get(key) else { return Vec::new() };
        match n {
            Some(n) if n < slot.len() => slot[slot.len() - n..].to_vec(),
            _ => slot.clone(),
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.messages.read().contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.messages.read().len()
    }

    pub fn remove(&self, key: &str) {
        self.messages.write().remove(key);
    }
}

/// Typically used in applications (e.g. a chatbot) that need access to
/// recent conversation context.
pub type LocalValueCache = LocalCache<Value>;

struct LocalCacheRead {
    cache: Arc<LocalValueCache>,
    default_delimiter: String,
    default_key: ArcStr,
}

#[async_trait]
impl CustomFunction for LocalCacheRead {
    async fn call(&self, _argument: Value) -> genc_value::Result<Value> {
        let mut out = String::new();
        for v in self.cache.get(&self.default_key, None) {
            if let Some(s) = v.as_str() {
                out.push_str(s);
            }
            out.push_str(&self.default_delimiter);
        }
        Ok(Value::str(out))
    }
}

struct LocalCacheWrite {
    cache: Arc<LocalValueCache>,
    default_key: ArcStr,
}

#[async_trait]
impl CustomFunction for LocalCacheWrite {
    async fn call(&self, argument: Value) -> genc_value::Result<Value> {
        self.cache.put(self.default_key.clone(), argument.clone());
        Ok(argument)
    }
}

struct LocalCacheRemove {
    cache: Arc<LocalValueCache>,
    default_key: ArcStr,
}

#[async_trait]
impl CustomFunction for LocalCacheRemove {
    async fn call(&self, argument: Value) -> genc_value::Result<Value> {
        self.cache.remove(&self.default_key);
        Ok(argument)
    }
}

/// Wires a shared [`LocalValueCache`] into a custom-function table under
/// the three stable local-cache URIs: read (concatenates every cached
/// message under `default_key`, delimiter-separated), write (appends the
/// argument under `default_key`, returning it unchanged), and remove
/// (clears `default_key`, returning the argument unchanged).
///
/// Always reads and writes `default_key` regardless of the call argument
/// — matching the source this is modeled on, which does not yet let a
/// caller address a different key per call.
pub fn register_local_value_cache_functions(
    functions: &mut FxHashMap<ArcStr, Arc<dyn CustomFunction>>,
    cache: Arc<LocalValueCache>,
    default_delimiter: impl Into<String>,
    default_key: impl Into<ArcStr>,
) {
    let default_key = default_key.into();
    let default_delimiter = default_delimiter.into();
    functions.insert(
        ArcStr::from("local_cache/read"),
        Arc::new(LocalCacheRead { cache: cache.clone(), default_delimiter, default_key: default_key.clone() }),
    );
    functions.insert(
        ArcStr::from("local_cache/write"),
        Arc::new(LocalCacheWrite { cache: cache.clone(), default_key: default_key.clone() }),
    );
    functions.insert(ArcStr::from("local_cache/remove"), Arc::new(LocalCacheRemove { cache, default_key }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_retrieves_messages_in_insertion_order() {
        let cache: LocalCache<String> = LocalCache::new(3);
        cache.put("key", "v1".to_string());
        cache.put("key", "v2".to_string());
        cache.put("key", "v3".to_string());
        assert_eq!(cache.get("key", None), vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn put_prunes_earliest_message_once_at_capacity() {
        let cache: LocalCache<String> = LocalCache::new(2);
        cache.put("key", "v1".to_string());
        cache.put("key", "v2".to_string());
        cache.put("key", "v3".to_string());
        assert_eq!(cache.get("key", None), vec!["v2", "v3"]);
    }

    #[test]
    fn get_with_n_returns_only_the_most_recent() {
        let cache: LocalCache<String> = LocalCache::new(5);
        for v in ["v1", "v2", "v3"] {
            cache.put("key", v.to_string());
        }
        assert_eq!(cache.get("key", Some(1)), vec!["v3"]);
    }

    #[test]
    fn remove_deletes_all_messages() {
        let cache: LocalCache<String> = LocalCache::new(2);
        cache.put("key", "v1".to_string());
        cache.put("key", "v2".to_string());
        cache.remove("key");
        assert!(!cache.exists("key"));
        assert!(cache.get("key", None).is_empty());
    }

    #[tokio::test]
    async fn custom_functions_read_write_round_trip() {
        let cache = Arc::new(LocalValueCache::new(100));
        let mut functions: FxHashMap<ArcStr, Arc<dyn CustomFunction>> = FxHashMap::default();
        register_local_value_cache_functions(&mut functions, cache, "\n", "default_key");

        let write = functions.get("local_cache/write").unwrap().clone();
        let read = functions.get("local_cache/read").unwrap().clone();

        write.call(Value::str("test")).await.unwrap();
        write.call(Value::str("test")).await.unwrap();
        let result = read.call(Value::str("")).await.unwrap();
        assert_eq!(result, Value::str("test\ntest\n"));
    }

    #[tokio::test]
    async fn custom_function_remove_clears_the_default_key() {
        let cache = Arc::new(LocalValueCache::new(100));
        let mut functions: FxHashMap<ArcStr, Arc<dyn CustomFunction>> = FxHashMap::default();
        register_local_value_cache_functions(&mut functions, cache.clone(), "\n", "default_key");

        functions.get("local_cache/write").unwrap().call(Value::str("test")).await.unwrap();
        functions.get("local_cache/remove").unwrap().call(Value::str("")).await.unwrap();

        assert!(!cache.exists("default_key"));
    }
}
