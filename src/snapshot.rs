// Catalog snapshots: the harvested catalog written as plain JSON plus gzip
// and lz4 compressed copies, and read back from any of the three.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::catalog::CardCatalog;
use crate::error::{Error, Result};

pub const SNAPSHOT_VERSION: &str = "1.0.0";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotMeta {
    pub version: String,
    pub generated_at_utc: DateTime<Utc>,
    pub total_cards: usize,
    pub data_sources: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub meta: SnapshotMeta,
    pub cards: Vec<Card>,
}

impl CatalogSnapshot {
    pub fn from_catalog(catalog: &CardCatalog, data_sources: Vec<String>) -> Self {
        let cards: Vec<Card> = catalog.cards().cloned().collect();
        CatalogSnapshot {
            meta: SnapshotMeta {
                version: SNAPSHOT_VERSION.to_string(),
                generated_at_utc: Utc::now(),
                total_cards: cards.len(),
                data_sources,
            },
            cards,
        }
    }

    pub fn into_catalog(self) -> CardCatalog {
        CardCatalog::from_cards(self.cards)
    }
}

/// Byte sizes of the three files written for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSizes {
    pub json: usize,
    pub gzip: usize,
    pub lz4: usize,
}

// Compression utilities
pub fn compress_with_gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut decoded)
        .map_err(|e| Error::Snapshot(format!("gzip: {}", e)))?;
    Ok(decoded)
}

pub fn compress_with_lz4(data: &[u8]) -> Vec<u8> {
    compress_prepend_size(data)
}

pub fn decompress_lz4(data: &[u8]) -> Result<Vec<u8>> {
    decompress_size_prepended(data).map_err(|e| Error::Snapshot(format!("lz4: {}", e)))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes `path`, `path.gz` and `path.lz4`.
pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &CatalogSnapshot) -> Result<SnapshotSizes> {
    let path = path.as_ref();
    let json = serde_json::to_vec(snapshot)?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&json)?;
    writer.flush()?;

    let gzip = compress_with_gzip(&json)?;
    fs::write(with_suffix(path, ".gz"), &gzip)?;

    let lz4 = compress_with_lz4(&json);
    fs::write(with_suffix(path, ".lz4"), &lz4)?;

    let sizes = SnapshotSizes {
        json: json.len(),
        gzip: gzip.len(),
        lz4: lz4.len(),
    };
    log::info!(
        "Snapshot of {} cards saved to '{}' (json {} KB, gzip {} KB, lz4 {} KB)",
        snapshot.meta.total_cards,
        path.display(),
        sizes.json / 1024,
        sizes.gzip / 1024,
        sizes.lz4 / 1024
    );
    Ok(sizes)
}

/// Reads a snapshot, choosing the decoder from the file extension.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<CatalogSnapshot> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let json = match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => decompress_gzip(&bytes)?,
        Some("lz4") => decompress_lz4(&bytes)?,
        _ => bytes,
    };
    Ok(serde_json::from_slice(&json)?)
}
