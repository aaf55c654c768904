use std::collections::HashMap;

/// Document id to preview image URL. Entries are never replaced or removed.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailCache {
    urls: HashMap<String, String>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL unless one is already cached. Returns whether it was stored.
    pub fn record(&mut self, id: &str, url: String) -> bool {
        if self.urls.contains_key(id) {
            return false;
        }
        self.urls.insert(id.to_string(), url);
        true
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.urls.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.urls.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_recorded_url_wins() {
        let mut cache = ThumbnailCache::new();
        assert!(cache.record("1", "https://img/a.jpg".into()));
        assert!(!cache.record("1", "https://img/b.jpg".into()));
        assert_eq!(cache.get("1"), Some("https://img/a.jpg"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_ids_stay_absent() {
        let cache = ThumbnailCache::new();
        assert!(!cache.contains("1"));
        assert!(cache.is_empty());
    }
}
