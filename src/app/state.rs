//! Application context shared by the router and the view layer

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{events, ApiClient, AuthApi, SessionEvent};
use crate::config::Config;
use crate::router::Router;
use crate::storage::{FileStorage, StorageError, TokenStorage};
use crate::store::{AuthStore, BusinessStore};

/// Everything one running front end needs, created at start-up and
/// torn down with [`AppContext::shutdown`].
pub struct AppContext {
    pub config: Arc<Config>,
    pub storage: Arc<dyn TokenStorage>,
    pub client: ApiClient,
    pub auth: Arc<AuthStore>,
    pub business: Arc<BusinessStore>,
    pub router: Arc<Router>,
    events_rx: Mutex<Option<broadcast::Receiver<SessionEvent>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AppContext {
    /// Build a context whose tokens persist in `config.session_file`
    pub fn new(config: Config) -> Result<Self, StorageError> {
        let storage = FileStorage::open(&config.session_file)?;
        Ok(Self::with_storage(config, Arc::new(storage)))
    }

    pub fn with_storage(config: Config, storage: Arc<dyn TokenStorage>) -> Self {
        let config = Arc::new(config);

        // Subscribe before anything can send so no invalidation is missed
        let (events_tx, events_rx) = events::channel();

        let client = ApiClient::new(config.api_url.clone(), storage.clone(), events_tx);
        let api = AuthApi::new(client.clone());

        let auth = Arc::new(AuthStore::new(api.clone()));
        let business = Arc::new(BusinessStore::new(api));
        let router = Arc::new(Router::new(auth.clone()));

        Self {
            config,
            storage,
            client,
            auth,
            business,
            router,
            events_rx: Mutex::new(Some(events_rx)),
            listener: Mutex::new(None),
        }
    }

    /// Start reacting to session events. Must run inside a tokio runtime.
    pub fn start(&self) {
        let Some(mut rx) = self.events_rx.lock().take() else {
            return;
        };

        let auth = self.auth.clone();
        let business = self.business.clone();
        let router = self.router.clone();

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => apply_session_event(event, &auth, &business, &router),
                    Err(RecvError::Lagged(n)) => {
                        warn!(lagged = n, "Session event receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        *self.listener.lock() = Some(handle);
        debug!("Session event listener started");
    }

    /// React to a session event synchronously
    pub fn handle_session_event(&self, event: SessionEvent) {
        apply_session_event(event, &self.auth, &self.business, &self.router);
    }

    /// Log out and drop every piece of session-derived state
    pub fn logout(&self) {
        self.auth.logout();
        self.business.reset();
    }

    /// Stop the event listener. Persisted tokens are kept.
    pub async fn shutdown(&self) {
        let handle = self.listener.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
        info!("Application context shut down");
    }
}

fn apply_session_event(
    event: SessionEvent,
    auth: &AuthStore,
    business: &BusinessStore,
    router: &Router,
) {
    match event {
        SessionEvent::Refreshed => debug!("Session refreshed"),
        SessionEvent::Invalidated => {
            auth.clear_session();
            business.reset();
            router.force_login();
        }
    }
}
