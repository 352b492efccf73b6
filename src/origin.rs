use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::storage::{StorageKind, StorageToken};
use crate::window::Window;

/// Insertion-ordered string map backing one storage area.
#[derive(Debug, Default)]
pub(crate) struct StorageMap {
    pairs: RefCell<Vec<(String, String)>>,
}

impl StorageMap {
    pub(crate) fn len(&self) -> usize {
        self.pairs.borrow().len()
    }

    pub(crate) fn key(&self, index: usize) -> Option<String> {
        self.pairs.borrow().get(index).map(|(name, _)| name.clone())
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.pairs
            .borrow()
            .iter()
            .find_map(|(name, value)| (name == key).then(|| value.clone()))
    }

    pub(crate) fn set(&self, key: &str, value: &str) {
        let mut pairs = self.pairs.borrow_mut();
        if let Some((_, stored)) = pairs.iter_mut().find(|(name, _)| name == key) {
            *stored = value.to_string();
        } else {
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    pub(crate) fn remove(&self, key: &str) {
        self.pairs.borrow_mut().retain(|(name, _)| name != key);
    }

    pub(crate) fn clear(&self) {
        self.pairs.borrow_mut().clear();
    }

    pub(crate) fn snapshot(&self) -> Vec<(String, String)> {
        self.pairs.borrow().clone()
    }
}

/// State shared by every window of one origin.
pub struct OriginRecord {
    origin: String,
    local: Rc<StorageMap>,
    session: Rc<StorageMap>,
    windows: RefCell<Vec<Window>>,
}

impl OriginRecord {
    fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            local: Rc::default(),
            session: Rc::default(),
            windows: RefCell::new(Vec::new()),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Every window ever attached to this origin, in attach order.
    ///
    /// Closed windows are kept: nothing removes an entry once attached, and
    /// callers walking this list rely on seeing them.
    pub fn windows(&self) -> Vec<Window> {
        self.windows.borrow().clone()
    }

    pub fn local_entries(&self) -> Vec<(String, String)> {
        self.local.snapshot()
    }

    pub fn session_entries(&self) -> Vec<(String, String)> {
        self.session.snapshot()
    }

    pub(crate) fn map(&self, kind: StorageKind) -> Rc<StorageMap> {
        match kind {
            StorageKind::Local => Rc::clone(&self.local),
            StorageKind::Session => Rc::clone(&self.session),
        }
    }

    pub(crate) fn attach_window(&self, window: Window) {
        self.windows.borrow_mut().push(window);
    }
}

/// Origin key → shared [`OriginRecord`].
///
/// Owned by whoever orchestrates the sandbox and handed by reference to each
/// [`Window`] constructor. Records are created on first use and live as long
/// as the registry.
#[derive(Default)]
pub struct OriginRegistry {
    records: RefCell<HashMap<String, Rc<OriginRecord>>>,
    next_storage_token: Cell<u64>,
}

impl OriginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `origin`, creating it when absent.
    pub fn record(&self, origin: &str) -> Rc<OriginRecord> {
        let mut records = self.records.borrow_mut();
        let record = records
            .entry(origin.to_string())
            .or_insert_with(|| Rc::new(OriginRecord::new(origin)));
        Rc::clone(record)
    }

    pub fn get(&self, origin: &str) -> Option<Rc<OriginRecord>> {
        self.records.borrow().get(origin).cloned()
    }

    pub fn origins(&self) -> Vec<String> {
        let mut origins = self.records.borrow().keys().cloned().collect::<Vec<_>>();
        origins.sort();
        origins
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Pre-populates `origin`'s localStorage. A key repeated in `pairs`
    /// overwrites its earlier value in place.
    pub fn seed_local_storage(&self, origin: &str, pairs: &[(&str, &str)]) {
        if pairs.is_empty() {
            return;
        }
        let map = self.record(origin).map(StorageKind::Local);
        for (key, value) in pairs {
            map.set(key, value);
        }
    }

    pub(crate) fn allocate_storage_token(&self) -> StorageToken {
        let token = self.next_storage_token.get() + 1;
        self.next_storage_token.set(token);
        StorageToken(token)
    }
}
