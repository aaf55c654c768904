use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Monotonic counter used to discard results of superseded async work.
///
/// Each new operation calls [`Generation::begin`]; its token stays current
/// until another operation begins or the owner calls [`Generation::invalidate`].
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct GenerationToken {
    id: u64,
    current: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> GenerationToken {
        let id = self.current.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
        GenerationToken {
            id,
            current: Arc::clone(&self.current),
        }
    }

    /// Token for the operation currently in progress, without superseding it.
    pub fn token(&self) -> GenerationToken {
        GenerationToken {
            id: self.current.load(Ordering::SeqCst),
            current: Arc::clone(&self.current),
        }
    }

    /// Makes every outstanding token stale.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

impl GenerationToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_token_supersedes_older() {
        let generation = Generation::new();
        let first = generation.begin();
        assert!(first.is_current());

        let second = generation.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.id() > first.id());
    }

    #[test]
    fn invalidate_makes_all_tokens_stale() {
        let generation = Generation::new();
        let token = generation.begin();
        generation.invalidate();
        assert!(!token.is_current());
    }

    #[test]
    fn token_tracks_the_running_operation() {
        let generation = Generation::new();
        let started = generation.begin();
        let observer = generation.token();
        assert_eq!(observer.id(), started.id());
        assert!(observer.is_current());

        generation.begin();
        assert!(!observer.is_current());
    }

    #[test]
    fn clones_share_the_counter() {
        let generation = Generation::new();
        let token = generation.begin();
        generation.clone().begin();
        assert!(!token.is_current());
    }
}
