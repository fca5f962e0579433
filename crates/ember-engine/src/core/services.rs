use log::LevelFilter;

use crate::error::UnsupportedOperation;

/// Receives pause / resume / dispose notifications.
///
/// This host never pauses or tears down from inside the application, so
/// registered listeners are stored but not invoked.
pub trait LifecycleListener {
    fn pause(&mut self) {}
    fn resume(&mut self) {}
    fn dispose(&mut self) {}
}

/// Handle returned by [`Services::add_lifecycle_listener`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

/// Persisted key/value preferences.
pub trait Preferences {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: &str);
    fn flush(&mut self);
}

/// Networking facade.
pub trait Net {
    fn open_uri(&mut self, uri: &str) -> bool;
}

/// Application-facing service facade.
///
/// Capabilities this host lacks fail fast with [`UnsupportedOperation`]
/// instead of degrading silently. `exit` is the one deliberate no-op.
pub struct Services {
    listeners: Vec<(ListenerId, Box<dyn LifecycleListener>)>,
    next_listener: u64,
}

impl Services {
    pub fn new() -> Self {
        Self { listeners: Vec::new(), next_listener: 0 }
    }

    pub fn version(&self) -> u32 {
        0
    }

    pub fn log_level(&self) -> LevelFilter {
        log::max_level()
    }

    pub fn set_log_level(&mut self, level: LevelFilter) {
        log::set_max_level(level);
    }

    pub fn add_lifecycle_listener(&mut self, listener: Box<dyn LifecycleListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_lifecycle_listener(&mut self, id: ListenerId) -> Option<Box<dyn LifecycleListener>> {
        let idx = self.listeners.iter().position(|(lid, _)| *lid == id)?;
        Some(self.listeners.remove(idx).1)
    }

    pub fn lifecycle_listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Ignored: the host owns process teardown.
    pub fn exit(&mut self) {
        log::info!("exit() not allowed on this host; ignored");
    }

    pub fn preferences(&mut self, _name: &str) -> Result<&mut dyn Preferences, UnsupportedOperation> {
        Err(UnsupportedOperation::new("preferences()"))
    }

    pub fn net(&mut self) -> Result<&mut dyn Net, UnsupportedOperation> {
        Err(UnsupportedOperation::new("net()"))
    }

    pub fn native_heap(&self) -> Result<u64, UnsupportedOperation> {
        Err(UnsupportedOperation::new("native_heap()"))
    }

    pub fn managed_heap(&self) -> Result<u64, UnsupportedOperation> {
        Err(UnsupportedOperation::new("managed_heap()"))
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl LifecycleListener for Noop {}

    #[test]
    fn listeners_add_and_remove_by_handle() {
        let mut s = Services::new();
        let a = s.add_lifecycle_listener(Box::new(Noop));
        let b = s.add_lifecycle_listener(Box::new(Noop));
        assert_ne!(a, b);
        assert_eq!(s.lifecycle_listener_count(), 2);

        assert!(s.remove_lifecycle_listener(a).is_some());
        assert!(s.remove_lifecycle_listener(a).is_none());
        assert_eq!(s.lifecycle_listener_count(), 1);
    }

    #[test]
    fn unsupported_surfaces_fail_fast() {
        let mut s = Services::new();
        assert_eq!(s.preferences("save").err().unwrap().operation, "preferences()");
        assert!(s.net().is_err());
        assert!(s.native_heap().is_err());
        assert!(s.managed_heap().is_err());
    }

    #[test]
    fn exit_is_a_no_op() {
        let mut s = Services::new();
        s.exit();
        assert_eq!(s.version(), 0);
    }
}
