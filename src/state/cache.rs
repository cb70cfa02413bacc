use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::CatImage;
use crate::error::AppError;

/// The ImageCache manages the SQLite database of previously seen images.
///
/// One row per image id; writing an id that already exists replaces the
/// whole row (and refreshes its recency), so writes are idempotent.
pub struct ImageCache {
    conn: Connection,
    db_path: PathBuf,
}

impl ImageCache {
    /// Open (or create) the cache database at the given path and
    /// initialize the schema.
    ///
    /// Background tasks open their own handle from the same path because
    /// a `rusqlite::Connection` cannot be shared between tasks.
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        let cache = ImageCache {
            conn,
            db_path: db_path.to_path_buf(),
        };
        cache.init_schema()?;

        Ok(cache)
    }

    /// Default database location in the user's data directory:
    /// - Linux: ~/.local/share/cat-gallery/cat_cache.db
    /// - macOS: ~/Library/Application Support/cat-gallery/cat_cache.db
    /// - Windows: %APPDATA%\cat-gallery\cat_cache.db
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(|| dirs::home_dir())
            .expect("Could not determine user data directory");

        path.push("cat-gallery");
        path.push("cat_cache.db");
        path
    }

    /// Create all necessary tables and indexes if they don't exist.
    fn init_schema(&self) -> Result<(), AppError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS cached_images (
                id              TEXT PRIMARY KEY,
                url             TEXT NOT NULL,
                width           INTEGER NOT NULL,
                height          INTEGER NOT NULL,
                inserted_at     INTEGER NOT NULL
            )",
            [],
        )?;

        // Index for reading the cache back newest-first
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cached_images_inserted_at
             ON cached_images(inserted_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Insert an image, replacing any existing row with the same id.
    pub fn upsert(&self, image: &CatImage) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cached_images (id, url, width, height, inserted_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                image.id,
                image.url,
                image.width,
                image.height,
                Utc::now().timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    /// Look up a single image by id.
    pub fn get_by_id(&self, id: &str) -> Result<Option<CatImage>, AppError> {
        let image = self
            .conn
            .query_row(
                "SELECT id, url, width, height FROM cached_images WHERE id = ?1",
                rusqlite::params![id],
                |row| {
                    Ok(CatImage {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        width: row.get(2)?,
                        height: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(image)
    }

    /// Get all cached images, most recently inserted first.
    ///
    /// Replaced rows count as re-inserted, so they come back near the top.
    /// The rowid tiebreak keeps same-millisecond inserts in order.
    pub fn get_all(&self) -> Result<Vec<CatImage>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, width, height FROM cached_images
             ORDER BY inserted_at DESC, rowid DESC",
        )?;

        let image_iter = stmt.query_map([], |row| {
            Ok(CatImage {
                id: row.get(0)?,
                url: row.get(1)?,
                width: row.get(2)?,
                height: row.get(3)?,
            })
        })?;

        let mut images = Vec::new();
        for image in image_iter {
            images.push(image?);
        }

        Ok(images)
    }

    /// Delete a single image by id. Deleting an absent id is a no-op.
    pub fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        self.conn.execute(
            "DELETE FROM cached_images WHERE id = ?1",
            rusqlite::params![id],
        )?;
        Ok(())
    }

    /// Delete every cached image.
    pub fn clear_all(&self) -> Result<(), AppError> {
        self.conn.execute("DELETE FROM cached_images", [])?;
        Ok(())
    }

    /// Number of cached images.
    pub fn image_count(&self) -> Result<i64, AppError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM cached_images", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("db_path", &self.db_path)
            .finish()
    }
}
