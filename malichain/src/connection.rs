//! Connection state and the wallet selection flow.
//!
//! [`ConnectionState`] is an explicitly owned, cloneable handle over a
//! [`tokio::sync::watch`] channel; the UI subscribes to it to re-render.
//! It has three writers: the connect flow, the disconnect flow and the
//! injected provider's `accountsChanged` handler.
//!
//! [`WalletController`] enforces the single-active-adapter rule and owns
//! the account subscription for the lifetime of a UI session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::wallet::{
    AccountSubscription, AdapterKind, DisconnectNotice, InjectedWallet, LedgerSession,
    NativeWallet, SharedHostProvider, WalletAdapter, WalletError, WalletInterface,
};

/// Point-in-time view of the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    /// The active adapter, if any.
    pub active: Option<AdapterKind>,
    /// Connected account; empty when disconnected.
    pub account: String,
    /// Whether the wallet selection prompt is open.
    pub dialog_open: bool,
}

impl ConnectionSnapshot {
    /// Whether an adapter is active with an account.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.active.is_some() && !self.account.is_empty()
    }
}

/// Shared, observable connection state.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    tx: Arc<watch::Sender<ConnectionSnapshot>>,
    generation: Arc<AtomicU64>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    /// Empty state: nothing active, no account, prompt closed.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionSnapshot::default());
        Self {
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionSnapshot> {
        self.tx.subscribe()
    }

    /// Connected account; empty when disconnected.
    #[must_use]
    pub fn account(&self) -> String {
        self.tx.borrow().account.clone()
    }

    /// The active adapter kind.
    #[must_use]
    pub fn active(&self) -> Option<AdapterKind> {
        self.tx.borrow().active
    }

    /// Current generation. Bumped by every connect attempt and disconnect.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a connect attempt; returns its generation ticket.
    pub fn begin_attempt(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `ticket` is still the latest generation.
    #[must_use]
    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation() == ticket
    }

    /// Open or close the selection prompt.
    pub fn set_dialog_open(&self, open: bool) {
        self.tx.send_if_modified(|s| {
            let changed = s.dialog_open != open;
            s.dialog_open = open;
            changed
        });
    }

    /// Record a successful connect and close the prompt.
    pub fn set_connected(&self, kind: AdapterKind, account: impl Into<String>) {
        let account = account.into();
        self.tx.send_modify(|s| {
            s.active = Some(kind);
            s.account = account;
            s.dialog_open = false;
        });
    }

    /// Apply an account-change notification from adapter `kind`.
    ///
    /// With accounts, the first becomes the connected address and `kind`
    /// becomes active, unless a different adapter is already active. An empty
    /// list clears the state if `kind` is the active adapter. Returns whether
    /// the state changed hands.
    pub fn apply_accounts_changed(&self, kind: AdapterKind, accounts: &[String]) -> bool {
        self.tx.send_if_modified(|s| {
            if s.active.is_some_and(|active| active != kind) {
                return false;
            }
            match accounts.first() {
                Some(first) => {
                    let changed = s.active != Some(kind) || s.account != *first || s.dialog_open;
                    s.active = Some(kind);
                    s.account.clone_from(first);
                    s.dialog_open = false;
                    changed
                }
                None => {
                    let changed = s.active.is_some() || !s.account.is_empty();
                    s.active = None;
                    s.account.clear();
                    changed
                }
            }
        })
    }

    /// Forget the active adapter and account; invalidates in-flight connects.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tx.send_modify(|s| {
            s.active = None;
            s.account.clear();
        });
    }
}

/// Result of [`WalletController::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The account was adopted and the prompt closed.
    Connected(String),
    /// The flow finished without an account; the prompt stays open.
    NoAccount,
    /// A later connect or disconnect made this result stale; it was dropped.
    ///
    /// If the stale attempt had already obtained an account, its session was
    /// torn down again; the notice says whether that succeeded.
    Superseded(Option<DisconnectNotice>),
}

/// UI-facing controller for wallet selection and connection.
#[derive(Debug)]
pub struct WalletController {
    state: ConnectionState,
    injected: InjectedWallet,
    native: Option<NativeWallet>,
    subscription: Mutex<Option<AccountSubscription>>,
}

impl WalletController {
    /// Create a controller for one UI session.
    ///
    /// `host` is the injected provider (`None` when no extension is
    /// installed); `session` is the native pairing session, if supported.
    #[must_use]
    pub fn new(
        config: AppConfig,
        host: Option<SharedHostProvider>,
        session: Option<Arc<dyn LedgerSession>>,
    ) -> Self {
        Self {
            state: ConnectionState::new(),
            injected: InjectedWallet::new(host, config),
            native: session.map(NativeWallet::new),
            subscription: Mutex::new(None),
        }
    }

    /// The connection state handle.
    #[must_use]
    pub const fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Adapter for `kind`, if that kind is available.
    #[must_use]
    pub fn adapter(&self, kind: AdapterKind) -> Option<WalletAdapter> {
        match kind {
            AdapterKind::Injected => Some(WalletAdapter::Injected(self.injected.clone())),
            AdapterKind::Native => self.native.clone().map(WalletAdapter::Native),
        }
    }

    /// The adapter currently holding the connection.
    #[must_use]
    pub fn active_wallet(&self) -> Option<WalletAdapter> {
        self.state.active().and_then(|kind| self.adapter(kind))
    }

    /// Start observing the injected provider and adopt any account it has
    /// already authorized.
    ///
    /// Does nothing when no extension is installed. Calling it again
    /// replaces the previous listener.
    pub async fn attach(&self) {
        if !self.injected.is_installed() {
            debug!("no injected provider, skipping account observation");
            return;
        }
        // Release any previous listener before registering a new one.
        self.detach();
        match self.injected.observe_account_changes(self.state.clone()) {
            Ok(subscription) => self.store_subscription(Some(subscription)),
            Err(e) => {
                warn!(error = %e, "could not observe account changes");
                return;
            }
        }
        if let Err(e) = self.injected.sync_accounts(&self.state).await {
            warn!(error = %e, "initial account sync failed");
        }
    }

    /// Remove the account listener, if registered.
    pub fn detach(&self) {
        self.store_subscription(None);
    }

    /// Whether an account listener is registered.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.subscription
            .lock()
            .map(|guard| guard.as_ref().is_some_and(AccountSubscription::is_active))
            .unwrap_or(false)
    }

    fn store_subscription(&self, subscription: Option<AccountSubscription>) {
        let previous = match self.subscription.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, subscription),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), subscription),
        };
        // Dropped outside the lock; removes the old listener.
        drop(previous);
    }

    /// Open the wallet selection prompt.
    pub fn open_selection(&self) {
        self.state.set_dialog_open(true);
    }

    /// Close the wallet selection prompt.
    pub fn close_selection(&self) {
        self.state.set_dialog_open(false);
    }

    /// Connect through the adapter of `kind`.
    ///
    /// On success the account is recorded and the prompt closes; otherwise
    /// the prompt stays open. A result that arrives after a newer connect
    /// attempt or a disconnect is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::ProviderMissing`] if the wallet kind is not
    /// available, and [`WalletError::AlreadyConnected`] if a different
    /// adapter is active.
    pub async fn connect(&self, kind: AdapterKind) -> Result<ConnectOutcome, WalletError> {
        if let Some(active) = self.state.active().filter(|&active| active != kind) {
            return Err(WalletError::AlreadyConnected(active));
        }
        let adapter = self
            .adapter(kind)
            .ok_or_else(WalletError::provider_missing)?;

        let ticket = self.state.begin_attempt();
        let result = adapter.connect().await;
        if !self.state.is_current(ticket) {
            debug!(%kind, "connect result is stale, dropping it");
            let notice = match result {
                Ok(Some(_)) => self.release_stale(&adapter).await,
                _ => None,
            };
            return Ok(ConnectOutcome::Superseded(notice));
        }

        match result? {
            Some(account) => {
                if let Some(active) = self.state.active().filter(|&active| active != kind) {
                    // Another adapter took over while we were suspended.
                    debug!(%kind, %active, "another adapter became active during connect");
                    let notice = self.release_stale(&adapter).await;
                    return Ok(ConnectOutcome::Superseded(notice));
                }
                info!(%kind, account = %account, "wallet connected");
                self.state.set_connected(kind, account.clone());
                Ok(ConnectOutcome::Connected(account))
            }
            None => Ok(ConnectOutcome::NoAccount),
        }
    }

    /// Tear down what a dropped connect attempt established.
    ///
    /// Skipped when a newer attempt of the same kind already holds the
    /// connection, since both share one session.
    async fn release_stale(&self, adapter: &WalletAdapter) -> Option<DisconnectNotice> {
        let kind = adapter.kind();
        if self.state.active() == Some(kind) {
            return None;
        }
        let notice = adapter.disconnect().await;
        match notice.message() {
            Some(message) => warn!(%kind, message, "stale connection left open"),
            None => info!(%kind, "stale connection released"),
        }
        Some(notice)
    }

    /// Disconnect the active adapter and clear local state.
    ///
    /// Local state is cleared whether or not the underlying session was
    /// terminated; the returned notice tells the caller which. Returns `None`
    /// if nothing was active.
    pub async fn disconnect(&self) -> Option<DisconnectNotice> {
        let adapter = self.active_wallet();
        let notice = match adapter {
            Some(adapter) => Some(adapter.disconnect().await),
            None => None,
        };
        self.state.clear();
        let manual_action = notice
            .as_ref()
            .and_then(DisconnectNotice::message)
            .is_some();
        info!(manual_action, "wallet disconnected");
        notice
    }
}
