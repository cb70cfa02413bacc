/// Repository composing the remote client and the persistent cache
///
/// Fetching always also persists, so everything the user has ever seen can
/// be redisplayed offline. The repository is `Clone` and each background
/// operation opens its own database handle from the stored path, because a
/// `rusqlite::Connection` cannot be shared between tasks.

use std::path::PathBuf;

use crate::error::AppError;
use crate::remote::CatApiClient;
use crate::state::cache::ImageCache;
use crate::state::data::CatImage;

#[derive(Debug, Clone)]
pub struct Repository {
    client: CatApiClient,
    db_path: PathBuf,
}

impl Repository {
    /// Build a repository over an explicit database path.
    ///
    /// The path is injected rather than discovered here so tests (and any
    /// future second window) can point it at their own database.
    pub fn new(client: CatApiClient, db_path: PathBuf) -> Self {
        Repository { client, db_path }
    }

    pub fn client(&self) -> &CatApiClient {
        &self.client
    }

    /// Fetch one image from the remote endpoint and persist it.
    ///
    /// If the fetch fails, the failure propagates unchanged and nothing is
    /// written: there is no partial cache entry to clean up.
    pub async fn fetch_and_cache_one(&self) -> Result<CatImage, AppError> {
        let cat = self.client.fetch_one().await?;

        let cache = ImageCache::open(&self.db_path)?;
        cache.upsert(&cat)?;

        Ok(cat)
    }

    /// Read every cached image, most recently seen first.
    ///
    /// Synchronous: called once at startup before the UI loop needs the
    /// result.
    pub fn load_cached(&self) -> Result<Vec<CatImage>, AppError> {
        let cache = ImageCache::open(&self.db_path)?;
        cache.get_all()
    }

    /// Wipe the persistent cache.
    ///
    /// The visible list is the controller's responsibility; this only
    /// touches the store.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        let cache = ImageCache::open(&self.db_path)?;
        cache.clear_all()
    }
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

    fn temp_repository() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(CatApiClient::new(), dir.path().join("cache.db"));
        (dir, repo)
    }

    #[test]
    fn test_load_cached_on_a_fresh_database_is_empty() {
        let (_dir, repo) = temp_repository();
        assert!(repo.load_cached().unwrap().is_empty());
    }

    #[test]
    fn test_load_cached_maps_rows_newest_first() {
        let (_dir, repo) = temp_repository();

        let cache = ImageCache::open(&repo.db_path).unwrap();
        cache.upsert(&sample("older")).unwrap();
        cache.upsert(&sample("newer")).unwrap();

        let ids: Vec<String> = repo
            .load_cached()
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(ids, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_clear_all_empties_the_store() {
        let (_dir, repo) = temp_repository();

        let cache = ImageCache::open(&repo.db_path).unwrap();
        cache.upsert(&sample("doomed")).unwrap();

        repo.clear_all().await.unwrap();

        assert!(repo.load_cached().unwrap().is_empty());
    }
}
