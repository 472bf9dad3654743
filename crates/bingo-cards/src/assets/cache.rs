use super::normalize::normalize_bytes;
use super::{AssetKind, AssetSource, NormalizedAsset};
use crate::options::RenderOptions;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Pixel targets for normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeSettings {
    pub photo_size_px: u32,
    pub background_max_px: (u32, u32),
    pub jpeg_quality: u8,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self::from(&RenderOptions::default())
    }
}

impl From<&RenderOptions> for NormalizeSettings {
    fn from(options: &RenderOptions) -> Self {
        Self {
            photo_size_px: options.photo_size_px,
            background_max_px: options.background_max_px,
            jpeg_quality: options.jpeg_quality,
        }
    }
}

/// Normalized assets for one document run, keyed by source reference.
///
/// Each reference is fetched and normalized at most once per cache; repeated
/// lookups return the same bytes.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<SourceRef, NormalizedAsset>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reference: &SourceRef) -> Option<&NormalizedAsset> {
        self.entries.get(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, asset: NormalizedAsset) {
        self.entries.insert(asset.source.clone(), asset);
    }

    /// Entries that degraded to the empty sentinel
    pub fn missing_count(&self) -> usize {
        self.entries.values().filter(|a| a.is_empty()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedAsset> {
        self.entries.values()
    }

    /// Fetch and normalize a photo, or return the cached one
    pub async fn normalize_photo<S: AssetSource>(
        &mut self,
        source: &S,
        reference: &SourceRef,
        settings: &NormalizeSettings,
    ) -> NormalizedAsset {
        self.normalize_one(source, reference, AssetKind::Photo, settings)
            .await
    }

    /// Fetch and normalize a background, or return the cached one
    pub async fn normalize_background<S: AssetSource>(
        &mut self,
        source: &S,
        reference: &SourceRef,
        settings: &NormalizeSettings,
    ) -> NormalizedAsset {
        self.normalize_one(source, reference, AssetKind::Background, settings)
            .await
    }

    async fn normalize_one<S: AssetSource>(
        &mut self,
        source: &S,
        reference: &SourceRef,
        kind: AssetKind,
        settings: &NormalizeSettings,
    ) -> NormalizedAsset {
        if let Some(cached) = self.entries.get(reference) {
            return cached.clone();
        }

        let asset = load_asset(source, reference.clone(), kind, *settings).await;
        self.insert(asset.clone());
        asset
    }

    /// Resolve every reference not already cached, at most `workers` at a time.
    ///
    /// Individual failures degrade to empty assets. Exceeding `deadline`
    /// aborts the outstanding fetches and fails the whole call.
    pub async fn resolve_all<S: AssetSource>(
        &mut self,
        source: Arc<S>,
        references: impl IntoIterator<Item = SourceRef>,
        kind: AssetKind,
        settings: &NormalizeSettings,
        workers: usize,
        deadline: Option<Duration>,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        let pending: Vec<SourceRef> = references
            .into_iter()
            .filter(|r| !self.entries.contains_key(r) && seen.insert(r.clone()))
            .collect();

        if pending.is_empty() {
            return Ok(());
        }

        log::debug!(
            "Resolving {} {:?} assets with {} workers",
            pending.len(),
            kind,
            workers
        );

        let permits = Arc::new(Semaphore::new(workers.max(1)));
        let mut tasks = JoinSet::new();
        for reference in pending {
            let source = Arc::clone(&source);
            let permits = Arc::clone(&permits);
            let settings = *settings;
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| BingoError::Asset(e.to_string()))?;
                Ok::<_, BingoError>(load_asset(&*source, reference, kind, settings).await)
            });
        }

        let collect = async {
            let mut loaded = Vec::new();
            while let Some(joined) = tasks.join_next().await {
                loaded.push(joined??);
            }
            Ok::<_, BingoError>(loaded)
        };

        let loaded = match deadline {
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(result) => result?,
                Err(_) => {
                    log::error!("Asset resolution exceeded {:?}", limit);
                    return Err(BingoError::AssetTimeout);
                }
            },
            None => collect.await?,
        };

        for asset in loaded {
            self.insert(asset);
        }
        Ok(())
    }
}

async fn load_asset<S: AssetSource + ?Sized>(
    source: &S,
    reference: SourceRef,
    kind: AssetKind,
    settings: NormalizeSettings,
) -> NormalizedAsset {
    let raw = match source.fetch_bytes(&reference).await {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Failed to fetch {}: {}", reference, e);
            return NormalizedAsset::empty(reference, kind);
        }
    };

    // Decode and resample off the async workers
    let encoded =
        tokio::task::spawn_blocking(move || normalize_bytes(&raw, kind, &settings)).await;

    match encoded {
        Ok(Ok(image)) => {
            NormalizedAsset::new(reference, kind, image.width, image.height, image.bytes)
        }
        Ok(Err(e)) => {
            log::warn!("Failed to normalize {}: {}", reference, e);
            NormalizedAsset::empty(reference, kind)
        }
        Err(e) => {
            log::warn!("Normalization task for {} failed: {}", reference, e);
            NormalizedAsset::empty(reference, kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetSource;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(24, 12, image::Rgb([10, 120, 60])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn settings() -> NormalizeSettings {
        NormalizeSettings {
            photo_size_px: 16,
            background_max_px: (40, 40),
            jpeg_quality: 90,
        }
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let source = MemoryAssetSource::new().with_blob("a.png", png());
        let mut cache = AssetCache::new();
        let reference = SourceRef::new("a.png");

        let first = cache.normalize_photo(&source, &reference, &settings()).await;
        let second = cache.normalize_photo(&source, &reference, &settings()).await;

        assert_eq!(source.fetch_count(), 1);
        assert_eq!(first.bytes(), second.bytes());
        assert_eq!((first.width, first.height), (16, 16));
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty() {
        let source = MemoryAssetSource::new().with_blob("broken.png", b"nope".to_vec());
        let mut cache = AssetCache::new();

        let broken = cache
            .normalize_photo(&source, &SourceRef::new("broken.png"), &settings())
            .await;
        let absent = cache
            .normalize_background(&source, &SourceRef::new("absent.png"), &settings())
            .await;

        assert!(broken.is_empty());
        assert!(absent.is_empty());
        assert_eq!(absent.kind, AssetKind::Background);
        assert_eq!(cache.missing_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_resolve_all_dedupes_and_skips_cached() {
        let source = Arc::new(
            MemoryAssetSource::new()
                .with_blob("a.png", png())
                .with_blob("b.png", png()),
        );
        let mut cache = AssetCache::new();
        let refs = vec![
            SourceRef::new("a.png"),
            SourceRef::new("b.png"),
            SourceRef::new("a.png"),
            SourceRef::new("c.png"),
        ];

        cache
            .resolve_all(source.clone(), refs.clone(), AssetKind::Photo, &settings(), 2, None)
            .await
            .unwrap();
        assert_eq!(source.fetch_count(), 3);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.missing_count(), 1);

        cache
            .resolve_all(source.clone(), refs, AssetKind::Photo, &settings(), 2, None)
            .await
            .unwrap();
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_resolve_all_respects_worker_limit() {
        let mut source = MemoryAssetSource::new().with_latency(Duration::from_millis(30));
        let refs: Vec<SourceRef> = (0..12)
            .map(|i| SourceRef::new(format!("{}.png", i)))
            .collect();
        for reference in &refs {
            source.insert(reference.clone(), png());
        }
        let source = Arc::new(source);
        let mut cache = AssetCache::new();

        cache
            .resolve_all(source.clone(), refs, AssetKind::Photo, &settings(), 3, None)
            .await
            .unwrap();

        assert_eq!(source.fetch_count(), 12);
        assert!(source.peak_in_flight() <= 3);
        assert!(source.peak_in_flight() >= 2);
        assert_eq!(cache.missing_count(), 0);
    }

    #[tokio::test]
    async fn test_deadline_aborts_resolution() {
        let source = Arc::new(
            MemoryAssetSource::new()
                .with_blob("slow.png", png())
                .with_latency(Duration::from_secs(5)),
        );
        let mut cache = AssetCache::new();

        let result = cache
            .resolve_all(
                source,
                vec![SourceRef::new("slow.png")],
                AssetKind::Photo,
                &settings(),
                1,
                Some(Duration::from_millis(20)),
            )
            .await;

        assert!(matches!(result, Err(BingoError::AssetTimeout)));
        assert!(cache.is_empty());
    }
}
