//! Asset pipeline
//!
//! Fetches user photos and theme backgrounds, normalizes them into
//! fixed-size JPEGs, and keeps them in a run-scoped [`AssetCache`].
//! Fetch or decode failures never abort a run: they yield an empty asset
//! that renderers skip.

mod cache;
mod normalize;
mod source;

pub use cache::{AssetCache, NormalizeSettings};
pub use normalize::{EncodedImage, normalize_background_bytes, normalize_bytes, normalize_photo_bytes};
pub use source::{AssetSource, FsAssetSource, MemoryAssetSource};

use crate::types::SourceRef;
use std::sync::Arc;

/// How an asset is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Center-cropped square
    Photo,
    /// Fit inside the print page bounds
    Background,
}

/// An embeddable JPEG, or the empty sentinel when loading failed
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAsset {
    pub source: SourceRef,
    pub kind: AssetKind,
    pub width: u32,
    pub height: u32,
    bytes: Arc<[u8]>,
}

impl NormalizedAsset {
    pub fn new(source: SourceRef, kind: AssetKind, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            source,
            kind,
            width,
            height,
            bytes: bytes.into(),
        }
    }

    /// Zero-length asset standing in for one that failed to load
    pub fn empty(source: SourceRef, kind: AssetKind) -> Self {
        Self::new(source, kind, 0, 0, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// JPEG bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
