use std::sync::{Mutex, MutexGuard, OnceLock};

pub fn test_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Sets (or removes, for `None`) environment variables for the lifetime of the
/// guard and restores the previous values on drop.
pub struct TestEnvGuard {
    _lock: MutexGuard<'static, ()>,
    previous: Vec<(&'static str, Option<String>)>,
}

impl TestEnvGuard {
    pub fn new(vars: &[(&'static str, Option<&str>)]) -> Self {
        let lock = test_lock().lock().unwrap_or_else(|err| err.into_inner());
        let previous = vars
            .iter()
            .map(|(name, _)| (*name, std::env::var(name).ok()))
            .collect();

        // SAFETY: tests using TestEnvGuard are serialized by test_lock.
        unsafe {
            for (name, value) in vars {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }

        Self {
            _lock: lock,
            previous,
        }
    }
}

impl Drop for TestEnvGuard {
    fn drop(&mut self) {
        // SAFETY: tests using TestEnvGuard are serialized by test_lock.
        unsafe {
            for (name, value) in &self.previous {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}
