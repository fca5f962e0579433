use std::fmt;

/// Path prefix of framework-bundled assets. These are always preloaded.
pub const RESERVED_PREFIX: &str = "ember/";

/// Declared asset type, as written in the manifest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AssetType {
    Image,
    Audio,
    Text,
    Binary,
    Directory,
}

impl AssetType {
    const ALL: [AssetType; 5] = [
        AssetType::Image,
        AssetType::Audio,
        AssetType::Text,
        AssetType::Binary,
        AssetType::Directory,
    ];

    /// Single-letter manifest code.
    pub const fn code(self) -> &'static str {
        match self {
            AssetType::Image => "i",
            AssetType::Audio => "a",
            AssetType::Text => "t",
            AssetType::Binary => "b",
            AssetType::Directory => "d",
        }
    }

    /// Resolves a manifest type code.
    ///
    /// Accepts the letter codes as well as the numeric ordinals `0..=4`.
    pub fn from_code(code: &str) -> Option<Self> {
        if let Ok(ordinal) = code.parse::<usize>() {
            return Self::ALL.get(ordinal).copied();
        }
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One resource declared by the manifest, plus its transfer state.
///
/// Declared fields are immutable. Transfer state only moves forward:
/// `download_started` and `succeeded` never go back to `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    file: String,
    kind: AssetType,
    size_in_bytes: u64,
    mime_type: String,
    preload_enabled: bool,
    should_preload: bool,

    download_started: bool,
    succeeded: bool,
    failed: bool,
    bytes_loaded: u64,
}

impl Asset {
    pub fn new(
        file: impl Into<String>,
        kind: AssetType,
        size_in_bytes: u64,
        mime_type: impl Into<String>,
        preload_enabled: bool,
    ) -> Self {
        let file = file.into();
        let should_preload = preload_enabled || file.starts_with(RESERVED_PREFIX);
        Self {
            file,
            kind,
            size_in_bytes,
            mime_type: mime_type.into(),
            preload_enabled,
            should_preload,
            download_started: false,
            succeeded: false,
            failed: false,
            bytes_loaded: 0,
        }
    }

    pub fn file(&self) -> &str { &self.file }
    pub fn kind(&self) -> AssetType { self.kind }
    pub fn size_in_bytes(&self) -> u64 { self.size_in_bytes }
    pub fn mime_type(&self) -> &str { &self.mime_type }
    pub fn preload_enabled(&self) -> bool { self.preload_enabled }

    /// Declared flag OR reserved-prefix path. Fixed at creation.
    pub fn should_preload(&self) -> bool { self.should_preload }

    pub fn download_started(&self) -> bool { self.download_started }
    pub fn succeeded(&self) -> bool { self.succeeded }
    pub fn failed(&self) -> bool { self.failed }
    pub fn bytes_loaded(&self) -> u64 { self.bytes_loaded }

    /// True once the asset either succeeded or failed.
    pub fn is_settled(&self) -> bool {
        self.succeeded || self.failed
    }

    pub(crate) fn mark_download_started(&mut self) {
        self.download_started = true;
    }

    /// Records transfer progress. Ignored once the asset succeeded.
    pub(crate) fn set_bytes_loaded(&mut self, loaded: u64) {
        if !self.succeeded {
            self.bytes_loaded = loaded;
        }
    }

    /// One-way: also snaps `bytes_loaded` to the declared size.
    pub(crate) fn mark_succeeded(&mut self) {
        self.succeeded = true;
        self.bytes_loaded = self.size_in_bytes;
    }

    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }

    /// Serializes the declared fields back into a manifest line.
    pub fn to_manifest_line(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.kind.code(),
            self.file,
            self.size_in_bytes,
            self.mime_type,
            if self.preload_enabled { "1" } else { "0" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_prefix_forces_preload() {
        let a = Asset::new("ember/data.txt", AssetType::Text, 100, "text/plain", false);
        assert!(!a.preload_enabled());
        assert!(a.should_preload());
    }

    #[test]
    fn plain_path_follows_declared_flag() {
        let on = Asset::new("logo.png", AssetType::Image, 10, "image/png", true);
        let off = Asset::new("logo.png", AssetType::Image, 10, "image/png", false);
        assert!(on.should_preload());
        assert!(!off.should_preload());
    }

    #[test]
    fn prefix_must_be_at_start() {
        let a = Asset::new("data/ember/x.bin", AssetType::Binary, 1, "application/octet-stream", false);
        assert!(!a.should_preload());
    }

    #[test]
    fn success_snaps_bytes_and_is_sticky() {
        let mut a = Asset::new("a.bin", AssetType::Binary, 64, "application/octet-stream", true);
        a.set_bytes_loaded(10);
        a.mark_succeeded();
        assert_eq!(a.bytes_loaded(), 64);

        // Late progress cannot move the counter away from the declared size.
        a.set_bytes_loaded(3);
        assert!(a.succeeded());
        assert_eq!(a.bytes_loaded(), 64);
    }

    #[test]
    fn failed_does_not_clear_succeeded() {
        let mut a = Asset::new("a.bin", AssetType::Binary, 1, "application/octet-stream", true);
        a.mark_succeeded();
        a.mark_failed();
        assert!(a.succeeded());
        assert!(a.failed());
    }

    #[test]
    fn type_codes_letters_and_ordinals() {
        assert_eq!(AssetType::from_code("i"), Some(AssetType::Image));
        assert_eq!(AssetType::from_code("d"), Some(AssetType::Directory));
        assert_eq!(AssetType::from_code("0"), Some(AssetType::Image));
        assert_eq!(AssetType::from_code("2"), Some(AssetType::Text));
        assert_eq!(AssetType::from_code("5"), None);
        assert_eq!(AssetType::from_code("x"), None);
    }

    #[test]
    fn manifest_line_uses_letter_code() {
        let a = Asset::new("sfx/hit.ogg", AssetType::Audio, 2048, "audio/ogg", true);
        assert_eq!(a.to_manifest_line(), "a:sfx/hit.ogg:2048:audio/ogg:1");
    }
}
