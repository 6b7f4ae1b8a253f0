/// Activity-local selection tied to the dependency key it was generated for.
///
/// Whenever the key observed by the caller differs from the stored one, the
/// previous selection is discarded and regenerated. The check is idempotent and
/// does not care which component of the key changed.
#[derive(Debug, Clone)]
pub struct SelectionCache<K, T> {
    entry: Option<(K, T)>,
}

impl<K, T> Default for SelectionCache<K, T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<K: PartialEq + Clone, T> SelectionCache<K, T> {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current selection if it was generated for `key`.
    pub fn get(&self, key: &K) -> Option<&T> {
        self.entry
            .as_ref()
            .filter(|(stored, _)| stored == key)
            .map(|(_, value)| value)
    }

    /// Mutable access to the selection if it was generated for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut T> {
        self.entry
            .as_mut()
            .filter(|(stored, _)| stored == key)
            .map(|(_, value)| value)
    }

    /// Return the selection for `key`, regenerating it when stale or missing.
    ///
    /// Returns `None` without storing anything when `generate` yields nothing.
    pub fn refresh<F>(&mut self, key: &K, generate: F) -> Option<&mut T>
    where
        F: FnOnce() -> Option<T>,
    {
        let stale = self
            .entry
            .as_ref()
            .is_none_or(|(stored, _)| stored != key);
        if stale {
            self.entry = generate().map(|value| (key.clone(), value));
        }
        self.entry.as_mut().map(|(_, value)| value)
    }

    /// Drop the selection regardless of its key.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regenerates_only_when_key_changes() {
        let mut cache: SelectionCache<(u8, u8), Vec<u8>> = SelectionCache::new();
        let mut generated = 0;

        cache.refresh(&(1, 0), || {
            generated += 1;
            Some(vec![1])
        });
        cache.refresh(&(1, 0), || {
            generated += 1;
            Some(vec![2])
        });
        assert_eq!(generated, 1);
        assert_eq!(cache.get(&(1, 0)), Some(&vec![1]));

        let value = cache.refresh(&(1, 1), || Some(vec![3])).cloned();
        assert_eq!(value, Some(vec![3]));
        assert_eq!(cache.get(&(1, 0)), None);
    }

    #[test]
    fn empty_generation_leaves_cache_empty() {
        let mut cache: SelectionCache<u8, u8> = SelectionCache::new();
        cache.refresh(&1, || Some(5));
        assert!(cache.refresh(&2, || None).is_none());
        assert_eq!(cache.get(&1), None);

        cache.refresh(&2, || Some(6));
        cache.invalidate();
        assert_eq!(cache.get(&2), None);
    }
}
