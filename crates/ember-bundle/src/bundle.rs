use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ember_engine::preload::{Asset, AssetType, MANIFEST_FILE};
use walkdir::{DirEntry, WalkDir};

const OCTET_STREAM: &str = "application/octet-stream";

/// Classifies a file by its leading bytes.
///
/// Images are recognised by `image`'s format sniffing, a few audio containers
/// by their magic, and anything that is valid UTF-8 without NUL bytes counts
/// as text. The rest is binary.
pub fn classify(bytes: &[u8]) -> (AssetType, String) {
    if let Ok(format) = image::guess_format(bytes) {
        return (AssetType::Image, format.to_mime_type().to_string());
    }

    if let Some(mime) = audio_mime(bytes) {
        return (AssetType::Audio, mime.to_string());
    }

    if !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok() {
        return (AssetType::Text, "text/plain".to_string());
    }

    (AssetType::Binary, OCTET_STREAM.to_string())
}

fn audio_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some("audio/wav"),
        [b'O', b'g', b'g', b'S', ..] => Some("audio/ogg"),
        [b'f', b'L', b'a', b'C', ..] => Some("audio/flac"),
        [b'I', b'D', b'3', ..] => Some("audio/mpeg"),
        // MPEG audio frame sync: 11 set bits.
        [0xFF, b, ..] if b & 0xE0 == 0xE0 => Some("audio/mpeg"),
        _ => None,
    }
}

/// Result of one bundler run.
#[derive(Debug)]
pub struct BundleReport {
    pub assets: Vec<Asset>,
    pub manifest: PathBuf,
    pub copied: usize,
}

impl BundleReport {
    pub fn total_bytes(&self) -> u64 {
        self.assets.iter().map(Asset::size_in_bytes).sum()
    }
}

/// Scans `source` and produces a bundle in `output`.
pub struct BundleGenerator {
    source: PathBuf,
    output: PathBuf,
}

impl BundleGenerator {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self { source: source.into(), output: output.into() }
    }

    /// Writes `<output>/assets.txt` and, if `copy` is set, mirrors the source
    /// tree into `output`.
    pub fn generate(&self, copy: bool) -> Result<BundleReport> {
        fs::create_dir_all(&self.output)
            .with_context(|| format!("failed to create output directory '{}'", self.output.display()))?;

        let assets = self.generate_assets()?;
        let manifest = self.output.join(MANIFEST_FILE);
        write_manifest(&manifest, &assets)?;
        log::info!("wrote {} entries to '{}'", assets.len(), manifest.display());

        let copied = if copy { self.copy_tree()? } else { 0 };
        Ok(BundleReport { assets, manifest, copied })
    }

    /// One preload-enabled asset per file, in walk order (sorted by name).
    /// Paths containing `:` cannot be expressed in the manifest and are left out.
    pub fn generate_assets(&self) -> Result<Vec<Asset>> {
        let mut assets = Vec::new();

        for entry in self.walk()? {
            if !entry.file_type().is_file() {
                continue;
            }

            let file = self.relative(entry.path())?;
            if file.contains(':') {
                log::warn!("skipping '{file}': ':' is the manifest field separator");
                continue;
            }

            let bytes = fs::read(entry.path())
                .with_context(|| format!("failed to read asset '{}'", entry.path().display()))?;
            let (kind, mime_type) = classify(&bytes);

            log::debug!("{file}: {kind} {mime_type}, {} bytes", bytes.len());
            assets.push(Asset::new(file, kind, bytes.len() as u64, mime_type, true));
        }

        Ok(assets)
    }

    fn copy_tree(&self) -> Result<usize> {
        let mut copied = 0;

        for entry in self.walk()? {
            let dest = self.output.join(self.relative(entry.path())?);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest)
                    .with_context(|| format!("failed to create '{}'", dest.display()))?;
            } else if entry.file_type().is_file() {
                fs::copy(entry.path(), &dest).with_context(|| {
                    format!("failed to copy '{}' to '{}'", entry.path().display(), dest.display())
                })?;
                copied += 1;
            }
        }

        log::info!("copied {copied} files into '{}'", self.output.display());
        Ok(copied)
    }

    /// Source entries, sorted by name. Skips the output directory (when it is
    /// nested in the source) and a stale root-level manifest.
    fn walk(&self) -> Result<Vec<DirEntry>> {
        let source = fs::canonicalize(&self.source)
            .with_context(|| format!("source directory '{}' not found", self.source.display()))?;
        let output = fs::canonicalize(&self.output).ok();
        let stale_manifest = source.join(MANIFEST_FILE);

        let mut entries = Vec::new();
        let walker = WalkDir::new(&self.source)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let canonical = fs::canonicalize(e.path()).ok();
                canonical.is_none() || canonical != output
            });

        for entry in walker {
            let entry = entry.with_context(|| format!("failed to walk '{}'", self.source.display()))?;
            if fs::canonicalize(entry.path()).ok().as_deref() == Some(stale_manifest.as_path()) {
                continue;
            }
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Path relative to the source root, `/`-separated.
    fn relative(&self, path: &Path) -> Result<String> {
        let rel = path
            .strip_prefix(&self.source)
            .with_context(|| format!("'{}' is outside the source tree", path.display()))?;

        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }
}

/// One manifest line per asset, `\n`-separated.
pub fn write_manifest(path: &Path, assets: &[Asset]) -> Result<()> {
    let body = assets
        .iter()
        .map(Asset::to_manifest_line)
        .collect::<Vec<_>>()
        .join("\n");

    fs::write(path, body).with_context(|| format!("failed to write manifest '{}'", path.display()))
}
