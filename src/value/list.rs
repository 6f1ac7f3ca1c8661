use super::Value;
use parking_lot::{Mutex, MutexGuard};
use std::{cell::RefCell, sync::Arc};

/// Shared, mutable sequence of values. Cloning the handle aliases the same storage.
///
/// A list of characters is how the language represents text.
#[derive(Clone, Default)]
pub struct List(Arc<Mutex<Vec<Value>>>);

impl List {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Arc::new(Mutex::new(items)))
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.chars().map(Value::Character).collect())
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Copies out the element handles so no lock is held while the caller works.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.lock().clone()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.lock().get(index).cloned()
    }

    /// Replaces the element at `index`, or appends when `index` is the length.
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.lock();
        if index < items.len() {
            items[index] = value;
        } else {
            items.push(value);
        }
    }

    pub fn insert(&self, index: usize, value: Value) {
        let mut items = self.0.lock();
        let index = index.min(items.len());
        items.insert(index, value);
    }

    pub fn remove(&self, index: usize) -> Option<Value> {
        let mut items = self.0.lock();
        if index < items.len() {
            Some(items.remove(index))
        } else {
            None
        }
    }

    pub fn rotate_left(&self, count: usize) {
        let mut items = self.0.lock();
        if !items.is_empty() {
            let count = count % items.len();
            items.rotate_left(count);
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Vec<Value>> {
        self.0.lock()
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the shared storage, used to spot cycles.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// A new list holding the same element handles.
    pub fn shallow_copy(&self) -> List {
        List::new(self.snapshot())
    }
}

thread_local! {
    static DEBUG_OPEN: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

impl std::fmt::Debug for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.id();
        if DEBUG_OPEN.with_borrow(|open| open.contains(&id)) {
            return write!(f, "[...]");
        }
        DEBUG_OPEN.with_borrow_mut(|open| open.push(id));
        let result = f.debug_list().entries(self.snapshot().iter()).finish();
        DEBUG_OPEN.with_borrow_mut(|open| open.pop());
        result
    }
}
