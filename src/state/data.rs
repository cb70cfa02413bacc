/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the remote endpoint, the cache layer and the UI layer.

use serde::Deserialize;

/// A single cat image as served by the search endpoint.
///
/// The same shape is persisted to the cache, one row per `id`.
/// The endpoint returns additional fields (breeds, categories);
/// serde ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatImage {
    /// Unique identifier assigned by the remote service
    pub id: String,
    /// Locator of the full-size image
    pub url: String,
    /// Pixel width as reported by the service
    pub width: u32,
    /// Pixel height as reported by the service
    pub height: u32,
}

/// Loading status of the gallery, owned exclusively by the controller.
///
/// `Idle` is both the initial state and the only one a new batch may start
/// from. `Error` is reachable only from `Loading` and clears back to `Idle`
/// when a retried batch succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Error,
}
