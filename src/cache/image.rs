//! Disk-backed cache for remote recipe images.

use std::path::{Path, PathBuf};
use url::Url;

/// Maps remote image URLs to locally cached files.
///
/// Entries are keyed by the final path segment of the URL (the filename) and
/// are never evicted; the cache lives for the session and grows with the set
/// of distinct images referenced.
pub struct ImageCache {
  dir: PathBuf,
  http: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
enum DownloadError {
  #[error(transparent)]
  Http(#[from] reqwest::Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl ImageCache {
  /// Create a cache rooted at `dir`, creating the directory if absent.
  ///
  /// Directory creation is best-effort: on failure the cache still
  /// constructs and every resolve falls back to the remote URL, so image
  /// display never blocks on cache infrastructure.
  pub fn new(dir: PathBuf) -> Self {
    if let Err(err) = std::fs::create_dir_all(&dir) {
      tracing::warn!(
        dir = %dir.display(),
        "failed to create image cache directory: {}",
        err
      );
    }
    Self {
      dir,
      http: reqwest::Client::new(),
    }
  }

  /// Platform default cache location.
  pub fn default_dir() -> Option<PathBuf> {
    dirs::cache_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))
      .map(|p| p.join("larder").join("images"))
  }

  /// Resolve a remote image URL to a usable reference.
  ///
  /// Returns the local file path when the image is already cached or the
  /// download succeeds, and the original `remote_url` on any failure
  /// (unparsable URL, missing filename segment, HTTP or write error).
  pub async fn resolve(&self, remote_url: &str) -> String {
    let Some(filename) = cache_filename(remote_url) else {
      return remote_url.to_string();
    };
    let local = self.dir.join(filename);

    if local.exists() {
      tracing::debug!(url = remote_url, "image cache hit");
      return local.display().to_string();
    }

    match self.download(remote_url, &local).await {
      Ok(()) => local.display().to_string(),
      Err(err) => {
        tracing::warn!(
          url = remote_url,
          "image download failed, serving remote URL: {}",
          err
        );
        remote_url.to_string()
      }
    }
  }

  async fn download(&self, remote_url: &str, target: &Path) -> Result<(), DownloadError> {
    let response = self
      .http
      .get(remote_url)
      .send()
      .await?
      .error_for_status()?;
    let bytes = response.bytes().await?;
    tokio::fs::write(target, &bytes).await?;
    Ok(())
  }
}

/// Derive the cache key from the URL's final path segment.
///
/// `None` when the URL does not parse or has no filename to key by.
fn cache_filename(remote_url: &str) -> Option<String> {
  let parsed = Url::parse(remote_url).ok()?;
  let segment = parsed.path_segments()?.next_back()?;
  if segment.is_empty() {
    return None;
  }
  Some(segment.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cache_filename_takes_last_segment() {
    assert_eq!(
      cache_filename("https://cdn.example.com/images/soup.jpg"),
      Some("soup.jpg".to_string())
    );
    assert_eq!(cache_filename("https://example.com/"), None);
    assert_eq!(cache_filename("not a url"), None);
  }

  #[tokio::test]
  async fn test_resolve_hit_returns_local_path_without_network() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cached = dir.path().join("soup.jpg");
    std::fs::write(&cached, b"jpeg bytes").expect("seed cache file");

    // The host is unroutable; a hit must not touch the network.
    let cache = ImageCache::new(dir.path().to_path_buf());
    let resolved = cache.resolve("http://127.0.0.1:9/images/soup.jpg").await;

    assert_eq!(resolved, cached.display().to_string());
  }

  #[tokio::test]
  async fn test_resolve_falls_back_to_remote_url_on_failed_download() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = ImageCache::new(dir.path().to_path_buf());

    let url = "http://127.0.0.1:9/images/broken.jpg";
    assert_eq!(cache.resolve(url).await, url);

    // Nothing was written for the failed download.
    assert!(!dir.path().join("broken.jpg").exists());
  }

  #[tokio::test]
  async fn test_resolve_without_filename_returns_remote_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = ImageCache::new(dir.path().to_path_buf());

    assert_eq!(cache.resolve("https://example.com/").await, "https://example.com/");
  }

  #[test]
  fn test_construction_survives_uncreatable_directory() {
    // A path under a file cannot be created; construction must not fail.
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"file").expect("seed blocker");

    let _cache = ImageCache::new(blocker.join("images"));
  }
}
