use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

const DEFAULT_STRIPES: usize = 64;

/// A fixed set of mutexes keyed by hash. Two keys may share a stripe, which
/// only costs contention; the same key always maps to the same stripe. Callers
/// hold the guard for the duration of a read-modify-write against the
/// repository. Memory stays constant however many keys pass through.
#[derive(Debug)]
pub(crate) struct KeyedLocks<K> {
    stripes: Vec<Mutex<()>>,
    _key: PhantomData<fn(&K)>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::with_stripes(DEFAULT_STRIPES)
    }
}

impl<K> KeyedLocks<K> {
    pub(crate) fn with_stripes(count: usize) -> Self {
        Self {
            stripes: (0..count.max(1)).map(|_| Mutex::new(())).collect(),
            _key: PhantomData,
        }
    }

    #[cfg(test)]
    pub(crate) fn stripe_count(&self) -> usize {
        self.stripes.len()
    }
}

impl<K> KeyedLocks<K>
where
    K: Hash,
{
    fn index(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    pub(crate) fn lock(&self, key: &K) -> MutexGuard<'_, ()> {
        self.stripes[self.index(key)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
