//! Blob store access

use crate::types::*;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Something that can turn a [`SourceRef`] into raw image bytes
pub trait AssetSource: Send + Sync + 'static {
    fn fetch_bytes(&self, reference: &SourceRef) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads assets from a directory; references are relative paths inside it
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &SourceRef) -> Result<PathBuf> {
        let relative = Path::new(reference.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(BingoError::Asset(format!(
                "'{}' is not a path inside the asset directory",
                reference
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetSource for FsAssetSource {
    async fn fetch_bytes(&self, reference: &SourceRef) -> Result<Vec<u8>> {
        let path = self.resolve(reference)?;
        Ok(tokio::fs::read(&path).await?)
    }
}

/// In-memory blob store that counts fetches
#[derive(Debug, Default)]
pub struct MemoryAssetSource {
    blobs: HashMap<SourceRef, Vec<u8>>,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    latency: Option<Duration>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(mut self, reference: impl Into<SourceRef>, bytes: Vec<u8>) -> Self {
        self.insert(reference, bytes);
        self
    }

    /// Delay every fetch by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&mut self, reference: impl Into<SourceRef>, bytes: Vec<u8>) {
        self.blobs.insert(reference.into(), bytes);
    }

    /// Number of fetches served so far, including failed ones
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Most fetches that were ever running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl AssetSource for MemoryAssetSource {
    async fn fetch_bytes(&self, reference: &SourceRef) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.blobs
            .get(reference)
            .cloned()
            .ok_or_else(|| BingoError::Asset(format!("no blob stored for '{}'", reference)))
    }
}
