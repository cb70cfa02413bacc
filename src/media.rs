/// On-disk media cache for downloaded images
///
/// Every image is downloaded once and stored in two tiers: a full-size
/// preview for the overlay and a 256px thumbnail for the grid. Once both
/// files exist the image renders without any network round trip, which is
/// what keeps previously seen images available offline.

use image::imageops::FilterType;
use std::fs;
use std::path::PathBuf;
use tokio::task;

use crate::error::AppError;
use crate::remote::CatApiClient;
use crate::state::data::CatImage;

/// Size of generated grid thumbnails (square bound)
const THUMBNAIL_SIZE: u32 = 256;

/// Paths of the two cached tiers for one image.
#[derive(Debug, Clone)]
pub struct CachedMedia {
    pub id: String,
    pub thumbnail: PathBuf,
    pub preview: PathBuf,
}

/// Get the thumbnail cache directory
/// Returns ~/.cache/cat-gallery/thumbnails on Linux
pub fn thumbnail_cache_dir() -> PathBuf {
    let mut path = dirs_next::cache_dir()
        .or_else(|| dirs_next::home_dir())
        .expect("Could not determine cache directory");

    path.push("cat-gallery");
    path.push("thumbnails");

    // Ensure the directory exists
    fs::create_dir_all(&path).expect("Failed to create thumbnail cache directory");

    path
}

/// Get the cache directory for full-size preview JPEGs
pub fn preview_cache_dir() -> PathBuf {
    let mut path = dirs::cache_dir()
        .or_else(|| dirs::home_dir())
        .expect("Could not determine cache directory");

    path.push("cat-gallery");
    path.push("previews");

    if !path.exists() {
        fs::create_dir_all(&path).expect("Failed to create preview cache directory");
    }

    path
}

/// Expected thumbnail location for an image id (doesn't generate)
pub fn thumbnail_path(id: &str) -> PathBuf {
    thumbnail_cache_dir().join(format!("{id}.jpg"))
}

/// Expected preview location for an image id (doesn't generate)
pub fn preview_path(id: &str) -> PathBuf {
    preview_cache_dir().join(format!("{id}.jpg"))
}

/// Make sure both media tiers for an image exist on disk.
///
/// Returns immediately when the files are already cached; otherwise
/// downloads the bytes once and writes both tiers. Decoding and resizing
/// are CPU-bound, so they run on a blocking thread.
pub async fn ensure_cached(client: CatApiClient, cat: CatImage) -> Result<CachedMedia, AppError> {
    let thumbnail = thumbnail_path(&cat.id);
    let preview = preview_path(&cat.id);

    if thumbnail.exists() && preview.exists() {
        return Ok(CachedMedia {
            id: cat.id,
            thumbnail,
            preview,
        });
    }

    let bytes = client.download(&cat.url).await?;

    let id = cat.id;
    let (thumbnail, preview) = task::spawn_blocking(move || {
        save_media_blocking(&bytes, thumbnail, preview)
    })
    .await
    .map_err(|e| AppError::Storage(format!("task join error: {e}")))??;

    Ok(CachedMedia {
        id,
        thumbnail,
        preview,
    })
}

/// Decode downloaded bytes and write both cache tiers.
///
/// Both tiers are re-encoded as RGB JPEG; the source may be PNG or GIF and
/// JPEG has no alpha channel.
fn save_media_blocking(
    bytes: &[u8],
    thumbnail: PathBuf,
    preview: PathBuf,
) -> Result<(PathBuf, PathBuf), AppError> {
    let img = image::load_from_memory(bytes)?;

    img.to_rgb8().save(&preview)?;

    let thumb = img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);
    thumb.to_rgb8().save(&thumbnail)?;

    Ok((thumbnail, preview))
}
