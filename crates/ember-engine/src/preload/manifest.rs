use crate::error::ParseError;

use super::asset::{Asset, AssetType};

/// Well-known manifest file name, resolved against the asset base URL.
pub const MANIFEST_FILE: &str = "assets.txt";

const FIELD_COUNT: usize = 5;

/// Parses a manifest document into assets, preserving line order.
///
/// Line format: `typeCode:filePath:sizeInBytes:mimeType:preloadFlag`.
/// Blank lines are skipped; any other malformed line aborts the parse.
pub fn parse_manifest(src: &str) -> Result<Vec<Asset>, ParseError> {
    let mut assets = Vec::new();
    let mut declared = 0u64;

    for (idx, raw) in src.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let asset = parse_line(idx + 1, line)?;

        // Progress sums declared sizes; the document total must fit in a u64.
        declared = declared
            .checked_add(asset.size_in_bytes())
            .ok_or_else(|| ParseError::new(idx + 1, "total declared size overflows"))?;
        assets.push(asset);
    }

    log::debug!("manifest parsed: {} assets", assets.len());
    Ok(assets)
}

fn parse_line(line_no: usize, line: &str) -> Result<Asset, ParseError> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::new(
            line_no,
            format!("expected {FIELD_COUNT} fields, got {}", fields.len()),
        ));
    }

    let [code, file, size, mime, flag] = [fields[0], fields[1], fields[2], fields[3], fields[4]];

    let kind = AssetType::from_code(code)
        .ok_or_else(|| ParseError::new(line_no, format!("unknown asset type code '{code}'")))?;

    if file.is_empty() {
        return Err(ParseError::new(line_no, "empty file path"));
    }

    let size_in_bytes = size
        .parse::<u64>()
        .map_err(|e| ParseError::new(line_no, format!("invalid size '{size}': {e}")))?;

    let preload_enabled = match flag {
        "1" => true,
        "0" => false,
        other => {
            return Err(ParseError::new(
                line_no,
                format!("preload flag must be 0 or 1, got '{other}'"),
            ));
        }
    };

    Ok(Asset::new(file, kind, size_in_bytes, mime, preload_enabled))
}
