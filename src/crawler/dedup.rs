//! Run-wide URL claim registry

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Set of article URLs already claimed during this run
///
/// `try_claim` performs the membership check and the insert under one lock
/// acquisition, so two callers presenting the same URL can never both win.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: Mutex<HashSet<String>>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for fetching
    ///
    /// Returns `true` the first time a URL is presented and `false` on every
    /// later presentation, whether from the same page or a later one.
    pub fn try_claim(&self, url: &str) -> bool {
        self.lock().insert(url.to_string())
    }

    /// Returns true if `url` has already been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the set half-updated.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_claim_wins() {
        let registry = DedupRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.try_claim("https://example.com/a"));
        assert!(!registry.try_claim("https://example.com/a"));
        assert!(registry.try_claim("https://example.com/b"));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("https://example.com/a"));
        assert!(!registry.contains("https://example.com/c"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_single_winner() {
        let registry = Arc::new(DedupRegistry::new());
        let mut handles = Vec::new();

        for _ in 0..64 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.try_claim("https://example.com/contested")
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_threads_claiming_overlapping_sets() {
        let registry = Arc::new(DedupRegistry::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|i| registry.try_claim(&format!("https://example.com/{}", i)))
                        .count()
                })
            })
            .collect();

        let granted: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();
        assert_eq!(granted, 100);
        assert_eq!(registry.len(), 100);
    }
}
