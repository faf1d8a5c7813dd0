//! Shutdown-hook registration
//!
//! Components that have to flush state before the process exits (such as the
//! thumbnail cache index) register a callback with a [`ShutdownHooks`]
//! registrar owned by the embedding application. The registrar makes no
//! promises about ordering between hooks, only that every registered hook is
//! invoked once before exit.

use crate::error::Result;
use parking_lot::Mutex;
use tracing::{info, warn};

type Hook = Box<dyn FnOnce() -> Result<()> + Send>;

/// Collects callbacks to run once at process shutdown
///
/// Hooks can be registered from any thread. Running the hooks consumes them;
/// a second [`run`](ShutdownHooks::run) is a no-op.
#[derive(Default)]
pub struct ShutdownHooks {
    hooks: Mutex<Vec<Hook>>,
}

impl ShutdownHooks {
    /// Create an empty registrar
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback to run at shutdown
    pub fn register<F>(&self, hook: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.hooks.lock().push(Box::new(hook));
    }

    /// Number of hooks currently registered
    pub fn len(&self) -> usize {
        self.hooks.lock().len()
    }

    /// True if no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.lock().is_empty()
    }

    /// Run all registered hooks, consuming them
    ///
    /// A failing hook is logged and does not stop the remaining hooks.
    /// Returns the number of hooks that failed.
    pub fn run(&self) -> usize {
        let hooks = std::mem::take(&mut *self.hooks.lock());
        info!("Running {} shutdown hooks", hooks.len());

        let mut failures = 0;
        for hook in hooks {
            if let Err(err) = hook() {
                warn!("Shutdown hook failed: {}", err);
                failures += 1;
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotemapError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_hooks_run_once() {
        let hooks = ShutdownHooks::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&counter);
        hooks.register(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks.run(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // a second run has nothing left to do
        assert_eq!(hooks.run(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failing_hook_does_not_stop_others() {
        let hooks = ShutdownHooks::new();
        let counter = Arc::new(AtomicUsize::new(0));

        hooks.register(|| Err(NotemapError::internal("flush failed")));
        let seen = Arc::clone(&counter);
        hooks.register(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(hooks.run(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
