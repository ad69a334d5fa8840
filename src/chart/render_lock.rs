use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// One mutex per output path so two renders of the same chart never interleave,
/// while renders of different charts still run in parallel.
#[derive(Debug, Default)]
pub struct RenderLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl RenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `path`.
    pub fn with_path<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(path.to_path_buf()).or_default())
        };
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    pub fn tracked_paths(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_path_runs_one_at_a_time() {
        let locks = Arc::new(RenderLocks::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let active = Arc::clone(&active);
                let max_active = Arc::clone(&max_active);
                thread::spawn(move || {
                    locks.with_path(Path::new("img/bar_Colombia.png"), || {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        max_active.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(10));
                        active.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker should finish");
        }
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
        assert_eq!(locks.tracked_paths(), 1);
    }

    #[test]
    fn returns_closure_result() {
        let locks = RenderLocks::new();
        let value = locks.with_path(Path::new("a.png"), || 42);
        assert_eq!(value, 42);
        locks.with_path(Path::new("b.png"), || ());
        assert_eq!(locks.tracked_paths(), 2);
    }
}
