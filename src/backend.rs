use std::sync::Arc;

use crate::cache::ListCache;
use crate::config::{BackendKind, SiteConfig};
use crate::editor::EditorError;
use crate::hosted::HostedClient;
use crate::media::hosted::HostedMedia;
use crate::media::local::LocalMedia;
use crate::media::MediaStore;
use crate::store::hosted::HostedStore;
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

/// Everything a handler needs to reach the backend, managed as Rocket state.
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn Store>,
    pub media: Arc<dyn MediaStore>,
    pub cache: Arc<ListCache>,
    /// Present when a hosted service URL is configured (tables or sign-in).
    pub hosted: Option<Arc<HostedClient>>,
    pub default_department: String,
}

impl Backend {
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn MediaStore>) -> Self {
        Backend {
            store,
            media,
            cache: Arc::new(ListCache::new()),
            hosted: None,
            default_department: "AIML".to_string(),
        }
    }

    /// Must be called outside the async runtime: the hosted client is blocking.
    pub fn from_config(config: &SiteConfig) -> Result<Self, String> {
        let hosted = if config.backend.url.trim().is_empty() {
            None
        } else {
            Some(Arc::new(HostedClient::new(&config.backend)?))
        };

        let (store, media): (Arc<dyn Store>, Arc<dyn MediaStore>) = match config.backend.kind {
            BackendKind::Hosted => {
                let client = hosted
                    .clone()
                    .ok_or("backend.url is required for the hosted backend")?;
                (
                    Arc::new(HostedStore::new(client.clone())),
                    Arc::new(HostedMedia::new(client)),
                )
            }
            BackendKind::Sqlite => (
                Arc::new(SqliteStore::new_at(&config.backend.sqlite_path)?),
                Arc::new(LocalMedia::new(&config.backend.uploads_dir)),
            ),
        };

        log::info!(
            "Backend: {} tables, {} media",
            store.backend_name(),
            media.backend_name()
        );

        Ok(Backend {
            hosted,
            default_department: config.site.default_department.clone(),
            ..Backend::new(store, media)
        })
    }

    /// Run blocking store/media work off the async executor.
    pub async fn run<T, F>(&self, f: F) -> Result<T, EditorError>
    where
        F: FnOnce(&Backend) -> T + Send + 'static,
        T: Send + 'static,
    {
        let backend = self.clone();
        rocket::tokio::task::spawn_blocking(move || f(&backend))
            .await
            .map_err(|e| EditorError::Unexpected(format!("Background task failed: {}", e)))
    }
}
