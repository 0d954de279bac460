use std::sync::Arc;

use crate::config::ServerConfig;
use crate::pdf::PdfRenderer;
use crate::storage::ObjectStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: roofline_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Event bus feeding the notification dispatcher.
    pub event_bus: Arc<roofline_events::EventBus>,
    /// Photo and PDF storage backend.
    pub store: Arc<dyn ObjectStore>,
    /// External PDF renderer, absent when `PDF_RENDERER_URL` is unset.
    pub pdf: Option<Arc<PdfRenderer>>,
}
