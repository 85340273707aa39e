//! Transient on-disk storage for rendered frames and intermediate clips.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::KenBurnsResult;

/// Per-request scratch area: `<root>/render-<pid>-<nanos>/image_<NNN>/frame_<NNNNN>.png`.
///
/// Each render request owns its own directory, so concurrent exports never share files, and
/// each slide's frames live under their own index so batches cannot collide. The directory is
/// removed on drop unless [`FrameStore::keep`] was called.
#[derive(Debug)]
pub struct FrameStore {
    dir: PathBuf,
    keep: bool,
}

impl FrameStore {
    /// Create a fresh request namespace under `root`.
    pub fn create(root: &Path) -> KenBurnsResult<Self> {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = root.join(format!("render-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create frame store '{}'", dir.display()))?;
        tracing::debug!(dir = %dir.display(), "frame store created");
        Ok(Self { dir, keep: false })
    }

    /// Create under the system temp directory.
    pub fn create_in_temp() -> KenBurnsResult<Self> {
        Self::create(&std::env::temp_dir().join("kenburns"))
    }

    /// Leave files on disk after drop.
    pub fn keep(&mut self) {
        self.keep = true;
    }

    /// Root of this request's namespace.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding one slide's frames.
    pub fn image_dir(&self, image_index: usize) -> PathBuf {
        self.dir.join(format!("image_{image_index:03}"))
    }

    /// Location of one frame.
    pub fn frame_path(&self, image_index: usize, frame_index: u64) -> PathBuf {
        self.image_dir(image_index)
            .join(format!("frame_{frame_index:05}.png"))
    }

    /// `printf`-style input pattern for a slide's frames, as ffmpeg's image2 demuxer expects.
    pub fn frame_pattern(&self, image_index: usize) -> PathBuf {
        self.image_dir(image_index).join("frame_%05d.png")
    }

    /// Location of a slide's encoded clip.
    pub fn clip_path(&self, image_index: usize) -> PathBuf {
        self.dir.join(format!("clip_{image_index:03}.mp4"))
    }

    /// Empty (or create) a slide's frame directory, discarding leftovers of an aborted batch.
    pub fn prepare_batch(&self, image_index: usize) -> KenBurnsResult<PathBuf> {
        let dir = self.image_dir(image_index);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)
                .with_context(|| format!("clear stale frames in '{}'", dir.display()))?;
        }
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create frame dir '{}'", dir.display()))?;
        Ok(dir)
    }

    /// Drop a slide's frames once its clip is encoded.
    pub fn release_batch(&self, image_index: usize) -> KenBurnsResult<()> {
        let dir = self.image_dir(image_index);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)
                .with_context(|| format!("remove frames in '{}'", dir.display()))?;
        }
        Ok(())
    }
}

impl Drop for FrameStore {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/store.rs"]
mod tests;
