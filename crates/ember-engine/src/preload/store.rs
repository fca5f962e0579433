use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Payloads of successfully preloaded assets, keyed by file path.
///
/// Cloning shares the same storage. The preloader writes into it; the hosted
/// application only reads. Both run on the loop thread, so borrows never nest.
#[derive(Clone, Default)]
pub struct AssetStore(Rc<RefCell<HashMap<String, Rc<[u8]>>>>);

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, file: &str, bytes: Vec<u8>) {
        self.0.borrow_mut().insert(file.to_string(), Rc::from(bytes));
    }

    pub fn contains(&self, file: &str) -> bool {
        self.0.borrow().contains_key(file)
    }

    /// Raw bytes of a loaded asset.
    pub fn bytes(&self, file: &str) -> Option<Rc<[u8]>> {
        self.0.borrow().get(file).cloned()
    }

    /// Loaded asset decoded as UTF-8. `None` if absent or not valid UTF-8.
    pub fn text(&self, file: &str) -> Option<String> {
        let bytes = self.bytes(file)?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let map = self.0.borrow();
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        f.debug_struct("AssetStore").field("files", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let writer = AssetStore::new();
        let reader = writer.clone();
        writer.insert("hello.txt", b"hi".to_vec());
        assert!(reader.contains("hello.txt"));
        assert_eq!(reader.text("hello.txt").as_deref(), Some("hi"));
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn text_rejects_invalid_utf8() {
        let s = AssetStore::new();
        s.insert("blob.bin", vec![0xff, 0xfe]);
        assert!(s.text("blob.bin").is_none());
        assert_eq!(&*s.bytes("blob.bin").unwrap(), &[0xff, 0xfe]);
    }
}
