use iced::{Element, Task, Theme};
use std::collections::HashMap;

mod error;
mod media;
mod remote;
mod repository;
mod state;
mod ui;

use error::AppError;
use media::CachedMedia;
use remote::CatApiClient;
use repository::Repository;
use state::cache::ImageCache;
use state::data::{CatImage, LoadingState};

/// Number of images fetched per pagination batch
const BATCH_SIZE: usize = 12;

/// Relative scroll offset at which the grid asks for another batch
const SCROLL_LOAD_THRESHOLD: f32 = 0.99;

/// Main application state
///
/// Single owner of all mutable gallery state. Background work runs inside
/// iced tasks and comes back as messages, so every mutation happens here
/// on the update loop and no locking exists anywhere.
struct CatGallery {
    repository: Repository,
    /// Images currently visible in the grid, in fetch order
    elements: Vec<CatImage>,
    /// Disk locations of downloaded media, keyed by image id
    media: HashMap<String, CachedMedia>,
    loading: LoadingState,
    /// Most recent batch failure, shown beside the retry control
    last_error: Option<AppError>,
    /// Index the overlay shows; persists across dismiss until re-selected
    selected: usize,
    overlay_visible: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User asked for more images (retry button or scroll trigger)
    LoadMore,
    /// Background pagination batch finished
    BatchLoaded(Result<Vec<CatImage>, AppError>),
    /// Both media tiers for one image are on disk
    MediaReady(Result<CachedMedia, AppError>),
    /// User tapped a grid tile
    Select(usize),
    /// User tapped the overlay
    DismissOverlay,
    /// User pressed the Clear button
    ClearAll,
    /// Background cache wipe finished
    CacheCleared(Result<(), AppError>),
    /// The grid's scroll position changed; payload is the relative
    /// vertical offset (1.0 = bottom)
    Scrolled(f32),
}

impl CatGallery {
    /// Create a new instance of the application over the default
    /// database location.
    fn new() -> (Self, Task<Message>) {
        let repository = Repository::new(CatApiClient::new(), ImageCache::default_path());
        Self::with_repository(repository)
    }

    /// Create the application over an explicit repository.
    ///
    /// Startup primes the grid from the cache: non-empty cache renders
    /// immediately with no network round trip, an empty (or unreadable)
    /// cache falls through to an automatic first batch.
    fn with_repository(repository: Repository) -> (Self, Task<Message>) {
        let cached = repository.load_cached().unwrap_or_else(|e| {
            eprintln!("⚠️  Failed to read the image cache, starting empty: {e}");
            Vec::new()
        });

        println!("🐱 Cat gallery initialized with {} cached images", cached.len());

        let mut gallery = CatGallery {
            repository,
            elements: cached,
            media: HashMap::new(),
            loading: LoadingState::Idle,
            last_error: None,
            selected: 0,
            overlay_visible: false,
            status: String::new(),
        };
        gallery.status = format!("Ready. {} images cached.", gallery.elements.len());

        let task = if gallery.elements.is_empty() {
            gallery.load_more()
        } else {
            let cached = gallery.elements.clone();
            gallery.media_tasks(&cached)
        };

        (gallery, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadMore => self.load_more(),

            Message::BatchLoaded(Ok(batch)) => {
                if self.loading != LoadingState::Loading {
                    return Task::none();
                }

                let before = self.elements.len();
                // The random endpoint can repeat itself; the grid key must
                // stay unique, so duplicates are dropped on append
                for cat in batch {
                    if !self.elements.iter().any(|e| e.id == cat.id) {
                        self.elements.push(cat);
                    }
                }
                let appended = self.elements[before..].to_vec();

                self.loading = LoadingState::Idle;
                self.last_error = None;
                self.status = format!(
                    "✅ Added {} images. {} total.",
                    appended.len(),
                    self.elements.len()
                );
                println!("✅ Batch complete: {} new images", appended.len());

                self.media_tasks(&appended)
            }

            Message::BatchLoaded(Err(e)) => {
                eprintln!("❌ Batch failed: {e}");
                self.loading = LoadingState::Error;
                self.status = "❌ Loading failed.".to_string();
                self.last_error = Some(e);
                Task::none()
            }

            Message::MediaReady(Ok(media)) => {
                self.media.insert(media.id.clone(), media);
                Task::none()
            }

            Message::MediaReady(Err(e)) => {
                // Cosmetic: the tile keeps its placeholder
                eprintln!("⚠️  Media caching failed: {e}");
                Task::none()
            }

            Message::Select(index) => {
                self.selected = index;
                self.overlay_visible = true;
                Task::none()
            }

            Message::DismissOverlay => {
                // The index is intentionally kept; the overlay just hides
                self.overlay_visible = false;
                Task::none()
            }

            Message::ClearAll => {
                // "Clear" is reset-and-reload, not a pure wipe
                self.elements.clear();
                self.media.clear();
                self.status = "Cleared. Reloading…".to_string();
                println!("🧹 Cleared the gallery; reloading");

                let wipe = Task::perform(clear_cache(self.repository.clone()), Message::CacheCleared);
                Task::batch([wipe, self.load_more()])
            }

            Message::CacheCleared(Ok(())) => {
                println!("🗑️  Image cache cleared");
                Task::none()
            }

            Message::CacheCleared(Err(e)) => {
                eprintln!("⚠️  Failed to clear the image cache: {e}");
                Task::none()
            }

            Message::Scrolled(offset) => {
                // Level-triggered: this fires on every viewport change near
                // the bottom; the Idle check keeps it from stacking batches
                if offset >= SCROLL_LOAD_THRESHOLD && self.loading == LoadingState::Idle {
                    self.load_more()
                } else {
                    Task::none()
                }
            }
        }
    }

    /// Start one pagination batch, unless one is already in flight.
    ///
    /// Also the retry path: calling this from the Error state re-enters
    /// Loading and runs the same batch again.
    fn load_more(&mut self) -> Task<Message> {
        if self.loading == LoadingState::Loading {
            return Task::none();
        }

        self.loading = LoadingState::Loading;
        self.status = format!("Loading {BATCH_SIZE} more images…");

        Task::perform(fetch_batch(self.repository.clone()), Message::BatchLoaded)
    }

    /// Kick off media-cache downloads for images that don't have their
    /// files on disk registered yet.
    fn media_tasks(&self, cats: &[CatImage]) -> Task<Message> {
        let tasks = cats
            .iter()
            .filter(|cat| !self.media.contains_key(&cat.id))
            .map(|cat| {
                Task::perform(
                    media::ensure_cached(self.repository.client().clone(), cat.clone()),
                    Message::MediaReady,
                )
            });

        Task::batch(tasks)
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        if self.overlay_visible {
            ui::overlay::view(self)
        } else {
            ui::grid::view(self)
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application("Cat Gallery", CatGallery::update, CatGallery::view)
        .theme(CatGallery::theme)
        .centered()
        .run_with(CatGallery::new)
}

/// Fetch one batch of images, persisting each as it arrives.
///
/// Strictly sequential: one fetch completes before the next starts. The
/// first failure aborts the remainder and fails the whole batch, so the
/// visible list only ever grows by a full batch. Images fetched before
/// the failure stay in the persistent cache (each write is idempotent).
async fn fetch_batch(repository: Repository) -> Result<Vec<CatImage>, AppError> {
    let mut batch = Vec::with_capacity(BATCH_SIZE);

    for _ in 0..BATCH_SIZE {
        batch.push(repository.fetch_and_cache_one().await?);
    }

    Ok(batch)
}

/// Wipe the persistent cache in the background.
async fn clear_cache(repository: Repository) -> Result<(), AppError> {
    repository.clear_all().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> CatImage {
        CatImage {
            id: id.to_string(),
            url: format!("https://cdn.example.com/{id}.jpg"),
            width: 640,
            height: 480,
        }
    }

    fn batch_of(n: usize, prefix: &str) -> Vec<CatImage> {
        (0..n).map(|i| sample(&format!("{prefix}{i}"))).collect()
    }

    /// Gallery over an empty temp database (startup auto-starts a batch).
    fn empty_gallery() -> (tempfile::TempDir, CatGallery) {
        let dir = tempfile::tempdir().unwrap();
        let repository = Repository::new(CatApiClient::new(), dir.path().join("cache.db"));
        let (gallery, _task) = CatGallery::with_repository(repository);
        (dir, gallery)
    }

    /// Gallery over a temp database pre-seeded with the given images.
    fn seeded_gallery(cats: &[CatImage]) -> (tempfile::TempDir, CatGallery) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cache.db");

        let cache = ImageCache::open(&db_path).unwrap();
        for cat in cats {
            cache.upsert(cat).unwrap();
        }
        drop(cache);

        let repository = Repository::new(CatApiClient::new(), db_path);
        let (gallery, _task) = CatGallery::with_repository(repository);
        (dir, gallery)
    }

    #[test]
    fn test_empty_cache_starts_empty_and_fetching() {
        let (_dir, gallery) = empty_gallery();

        assert!(gallery.elements.is_empty());
        assert_eq!(gallery.loading, LoadingState::Loading);
    }

    #[test]
    fn test_seeded_cache_shows_rows_without_fetching() {
        let seeds = batch_of(5, "cat");
        let (_dir, gallery) = seeded_gallery(&seeds);

        assert_eq!(gallery.elements.len(), 5);
        assert_eq!(gallery.loading, LoadingState::Idle);
        // Most recently inserted first
        assert_eq!(gallery.elements[0].id, "cat4");
        assert_eq!(gallery.elements[4].id, "cat0");
    }

    #[test]
    fn test_successful_batch_appends_all_and_returns_to_idle() {
        let (_dir, mut gallery) = empty_gallery();
        assert_eq!(gallery.loading, LoadingState::Loading);

        let _ = gallery.update(Message::BatchLoaded(Ok(batch_of(BATCH_SIZE, "new"))));

        assert_eq!(gallery.elements.len(), BATCH_SIZE);
        assert_eq!(gallery.loading, LoadingState::Idle);
        assert_eq!(gallery.last_error, None);
    }

    #[test]
    fn test_failed_batch_leaves_list_unchanged_and_sets_error() {
        let seeds = batch_of(3, "kept");
        let (_dir, mut gallery) = seeded_gallery(&seeds);
        let _ = gallery.update(Message::Scrolled(1.0));
        assert_eq!(gallery.loading, LoadingState::Loading);

        let _ = gallery.update(Message::BatchLoaded(Err(AppError::Fetch(
            "connection reset".into(),
        ))));

        assert_eq!(gallery.elements.len(), 3);
        assert_eq!(gallery.loading, LoadingState::Error);
        assert!(gallery.last_error.is_some());
    }

    #[test]
    fn test_load_more_is_a_noop_while_loading() {
        let (_dir, mut gallery) = empty_gallery();
        assert_eq!(gallery.loading, LoadingState::Loading);
        let status_before = gallery.status.clone();

        let _ = gallery.update(Message::LoadMore);

        assert_eq!(gallery.loading, LoadingState::Loading);
        assert_eq!(gallery.status, status_before);
        assert!(gallery.elements.is_empty());
    }

    #[test]
    fn test_retry_from_error_reenters_loading() {
        let (_dir, mut gallery) = empty_gallery();
        let _ = gallery.update(Message::BatchLoaded(Err(AppError::Fetch("boom".into()))));
        assert_eq!(gallery.loading, LoadingState::Error);

        let _ = gallery.update(Message::LoadMore);

        assert_eq!(gallery.loading, LoadingState::Loading);
    }

    #[test]
    fn test_duplicate_ids_are_appended_only_once() {
        let (_dir, mut gallery) = empty_gallery();
        let _ = gallery.update(Message::BatchLoaded(Ok(vec![sample("a"), sample("b")])));
        assert_eq!(gallery.elements.len(), 2);

        let _ = gallery.update(Message::Scrolled(1.0));
        let _ = gallery.update(Message::BatchLoaded(Ok(vec![
            sample("b"),
            sample("c"),
            sample("c"),
        ])));

        let ids: Vec<&str> = gallery.elements.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_select_shows_overlay_and_dismiss_keeps_index() {
        let seeds = batch_of(5, "cat");
        let (_dir, mut gallery) = seeded_gallery(&seeds);

        let _ = gallery.update(Message::Select(3));
        assert!(gallery.overlay_visible);
        assert_eq!(gallery.selected, 3);

        let _ = gallery.update(Message::DismissOverlay);
        assert!(!gallery.overlay_visible);
        assert_eq!(gallery.selected, 3);
    }

    #[test]
    fn test_clear_all_empties_the_list_and_reloads() {
        let seeds = batch_of(5, "cat");
        let (_dir, mut gallery) = seeded_gallery(&seeds);
        assert_eq!(gallery.loading, LoadingState::Idle);

        let _ = gallery.update(Message::ClearAll);

        assert!(gallery.elements.is_empty());
        assert!(gallery.media.is_empty());
        assert_eq!(gallery.loading, LoadingState::Loading);
    }

    #[test]
    fn test_batch_landing_after_clear_still_appends() {
        // Preserved original behavior: clearing while a batch is in flight
        // does not cancel it, and its result lands in the emptied list.
        let seeds = batch_of(5, "cat");
        let (_dir, mut gallery) = seeded_gallery(&seeds);
        let _ = gallery.update(Message::Scrolled(1.0));
        assert_eq!(gallery.loading, LoadingState::Loading);

        let _ = gallery.update(Message::ClearAll);
        assert!(gallery.elements.is_empty());
        assert_eq!(gallery.loading, LoadingState::Loading);

        let _ = gallery.update(Message::BatchLoaded(Ok(batch_of(BATCH_SIZE, "new"))));
        assert_eq!(gallery.elements.len(), BATCH_SIZE);
        assert_eq!(gallery.loading, LoadingState::Idle);
    }

    #[test]
    fn test_scroll_at_end_starts_a_batch_only_when_idle() {
        let seeds = batch_of(5, "cat");
        let (_dir, mut gallery) = seeded_gallery(&seeds);

        let _ = gallery.update(Message::Scrolled(1.0));
        assert_eq!(gallery.loading, LoadingState::Loading);

        // Level-triggered repeats are absorbed
        let _ = gallery.update(Message::Scrolled(1.0));
        assert_eq!(gallery.loading, LoadingState::Loading);
        assert_eq!(gallery.elements.len(), 5);
    }

    #[test]
    fn test_scroll_below_threshold_does_nothing() {
        let seeds = batch_of(5, "cat");
        let (_dir, mut gallery) = seeded_gallery(&seeds);

        let _ = gallery.update(Message::Scrolled(0.5));

        assert_eq!(gallery.loading, LoadingState::Idle);
    }

    #[test]
    fn test_scroll_at_end_does_not_retry_from_error() {
        // Only the explicit retry control leaves the Error state
        let (_dir, mut gallery) = empty_gallery();
        let _ = gallery.update(Message::BatchLoaded(Err(AppError::Fetch("boom".into()))));

        let _ = gallery.update(Message::Scrolled(1.0));

        assert_eq!(gallery.loading, LoadingState::Error);
    }

    #[test]
    fn test_media_ready_registers_the_tiers() {
        let (_dir, mut gallery) = empty_gallery();

        let _ = gallery.update(Message::MediaReady(Ok(CachedMedia {
            id: "cat0".to_string(),
            thumbnail: "/tmp/t.jpg".into(),
            preview: "/tmp/p.jpg".into(),
        })));

        assert!(gallery.media.contains_key("cat0"));
    }

    #[test]
    fn test_media_failure_changes_nothing_visible() {
        let seeds = batch_of(2, "cat");
        let (_dir, mut gallery) = seeded_gallery(&seeds);

        let _ = gallery.update(Message::MediaReady(Err(AppError::Storage("disk".into()))));

        assert_eq!(gallery.elements.len(), 2);
        assert_eq!(gallery.loading, LoadingState::Idle);
        assert!(gallery.media.is_empty());
    }
}
