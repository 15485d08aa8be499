//! Loads the project's env file into this process, so the build and the
//! program it runs inherit it.

use crate::config::EnvFile;
use anyhow::{Context, Result};

/// Returns whether a file was loaded. Values in the file replace variables
/// already set in the environment.
pub fn load(env_file: &EnvFile) -> Result<bool> {
    match dotenvy::from_path_override(&env_file.path) {
        Ok(()) => {
            tracing::info!(path = %env_file.path.display(), "loaded env file");
            Ok(true)
        }
        Err(err) if err.not_found() && !env_file.required => {
            tracing::debug!(path = %env_file.path.display(), "no env file");
            Ok(false)
        }
        Err(err) => Err(err)
            .with_context(|| format!("Failed to load env file {}", env_file.path.display())),
    }
}

/// Serialises tests that touch the process environment.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
