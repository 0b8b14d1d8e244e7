//! Scoped `accountsChanged` listener.

use tracing::debug;

use crate::wallet::host::{ACCOUNTS_CHANGED, SharedHostProvider};

/// Handle for an `accountsChanged` listener registered on the host.
///
/// The listener is removed exactly once: by [`release`](Self::release) or,
/// on any other exit path, when the handle is dropped.
#[derive(Debug)]
#[must_use = "dropping the subscription removes the listener immediately"]
pub struct AccountSubscription {
    host: SharedHostProvider,
    active: bool,
}

impl AccountSubscription {
    pub(super) const fn new(host: SharedHostProvider) -> Self {
        Self { host, active: true }
    }

    /// Whether the listener is still registered.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Remove the listener now.
    pub fn release(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.active {
            self.active = false;
            self.host.remove_all_listeners(ACCOUNTS_CHANGED);
            debug!("removed accountsChanged listener");
        }
    }
}

impl Drop for AccountSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}
