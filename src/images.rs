use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Encoded raster payload for one PDF image XObject.
#[derive(Debug, Clone)]
pub(crate) enum ImageData {
    /// JPEG bytes embedded verbatim via `DCTDecode`.
    Jpeg(Vec<u8>),
    /// Interleaved 8-bit RGB channels, plus an optional 8-bit alpha plane
    /// carried as a soft mask.
    Raw {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct StoredImage {
    pub width: u32,
    pub height: u32,
    pub data: ImageData,
}

/// Resource-id keyed image table for one document. Identical payloads are
/// deduplicated so a logo reused across pages is embedded once.
#[derive(Debug, Default)]
pub(crate) struct ImageStore {
    by_id: BTreeMap<String, StoredImage>,
    by_digest: BTreeMap<[u8; 32], String>,
    next_index: usize,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: StoredImage) -> String {
        let digest = digest_of(&image);
        if let Some(existing) = self.by_digest.get(&digest) {
            return existing.clone();
        }
        self.next_index += 1;
        let id = format!("img{}", self.next_index);
        self.by_digest.insert(digest, id.clone());
        self.by_id.insert(id.clone(), image);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StoredImage)> {
        self.by_id.iter()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

fn digest_of(image: &StoredImage) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(image.width.to_le_bytes());
    hasher.update(image.height.to_le_bytes());
    match &image.data {
        ImageData::Jpeg(bytes) => {
            hasher.update([0u8]);
            hasher.update(bytes);
        }
        ImageData::Raw { rgb, alpha } => {
            hasher.update([1u8]);
            hasher.update(rgb);
            if let Some(alpha) = alpha {
                hasher.update([2u8]);
                hasher.update(alpha);
            }
        }
    }
    hasher.finalize().into()
}
