use crate::error::EngineError;
use crate::media::AudioFormat;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Artifacts older than this are removed by the sweep.
pub const RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// How often the background sweeper wakes up.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// A finished audio file persisted by one synthesis request.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    pub id: Uuid,
    pub path: PathBuf,
    pub format: AudioFormat,
    pub created_at: DateTime<Utc>,
}

/// Flat directory of generated audio files named by random id plus format
/// extension. No index, no sidecar metadata; staleness is derived from the
/// filesystem modification time alone.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    async fn ensure_dir(&self) -> Result<(), EngineError> {
        if !fs::try_exists(&self.dir).await? {
            debug!("creating cache directory: {}", self.dir.display());
            fs::create_dir_all(&self.dir).await?;
        }
        Ok(())
    }

    /// Persist finished audio under a fresh random id. Concurrent writers
    /// never contend on the same path, so a plain single write is atomic
    /// enough for every reader this store has.
    pub async fn write(
        &self,
        bytes: &[u8],
        format: AudioFormat,
    ) -> Result<CachedArtifact, EngineError> {
        self.ensure_dir().await?;
        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{}.{}", id, format.extension()));
        fs::write(&path, bytes).await?;
        info!("stored artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(CachedArtifact {
            id,
            path,
            format,
            created_at: Utc::now(),
        })
    }

    /// Resolve an artifact id to its file, probing the known extensions.
    pub async fn artifact_path(&self, id: &Uuid) -> Option<(PathBuf, AudioFormat)> {
        for format in [AudioFormat::Wav, AudioFormat::Mp3] {
            let path = self.dir.join(format!("{}.{}", id, format.extension()));
            if fs::try_exists(&path).await.unwrap_or(false) {
                return Some((path, format));
            }
        }
        None
    }

    /// Remove every entry whose modification time is older than `retention`.
    ///
    /// Per-entry failures are logged and skipped; a file vanishing between
    /// listing and deletion counts as already removed. Returns the number of
    /// entries deleted.
    pub async fn sweep(&self, retention: Duration) -> usize {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!("cache sweep: failed to list {}: {}", self.dir.display(), e);
                return 0;
            }
        };
        let now = SystemTime::now();
        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("cache sweep: failed to read entry: {}", e);
                    break;
                }
            };
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(
                        "cache sweep: no modification time for {}: {}",
                        entry.path().display(),
                        e
                    );
                    continue;
                }
            };
            // A file younger than the threshold is never deleted; clock skew
            // makes it look age zero, not negative.
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= retention {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(_) => {
                    info!("removed old cache file: {}", entry.path().display());
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(
                        "cache file vanished before removal: {}",
                        entry.path().display()
                    );
                }
                Err(e) => {
                    warn!(
                        "error removing cache file {}: {}",
                        entry.path().display(),
                        e
                    );
                }
            }
        }
        removed
    }
}
