use std::sync::{Mutex, OnceLock};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Runs `run` while holding the process-wide environment lock.
///
/// Config tests read `HOME` and `HOLDON_*`, so every test that touches them
/// goes through here. A poisoned lock from a failed test is reused.
pub(crate) fn with_locked_env<R>(run: impl FnOnce() -> R) -> R {
    let _guard = env_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    run()
}

/// Sets an environment variable; call inside [`with_locked_env`].
pub(crate) fn set_env_var(key: &str, value: &str) {
    // SAFETY: callers hold the env lock, so no other test thread touches the environment.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Removes an environment variable; call inside [`with_locked_env`].
pub(crate) fn remove_env_var(key: &str) {
    // SAFETY: callers hold the env lock, so no other test thread touches the environment.
    unsafe {
        std::env::remove_var(key);
    }
}
