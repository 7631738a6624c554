use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::core::input::InputDriver;
use crate::errors::{NavigatorError, Result};

/// Press `key`, keep it down for `duration`, release it.
pub fn hold_key(input: &dyn InputDriver, key: &str, duration: Duration) -> Result<()> {
    input.key_down(key)?;
    log::debug!("keyboard down: {} for {:?}", key, duration);
    thread::sleep(duration);
    input.key_up(key)?;
    log::debug!("keyboard up: {}", key);
    Ok(())
}

/// Join handle for a background key hold. The hold cannot be cancelled once
/// started; dropping the handle detaches it.
pub struct HoldHandle {
    key: String,
    handle: JoinHandle<Result<()>>,
}

impl HoldHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the key has been released.
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| NavigatorError::Input(format!("hold worker for {:?} panicked", self.key)))?
    }
}

/// Run [`hold_key`] on its own thread so the caller is not blocked.
pub fn spawn_key_hold(input: Arc<dyn InputDriver>, key: String, duration: Duration) -> HoldHandle {
    let thread_key = key.clone();
    let handle = thread::spawn(move || hold_key(input.as_ref(), &thread_key, duration));
    HoldHandle { key, handle }
}
