//! Key-value persistence backends
//!
//! A column layout is one JSON string per storage key. Backends are
//! synchronous and best effort: a failed write is logged, never raised.

pub mod file_store;
pub mod memory_store;

use std::cell::RefCell;
use std::rc::Rc;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value)
    }
}

/// Lets several tables share one backend. Writes to the same key are last
/// write wins.
impl<T: KeyValueStore> KeyValueStore for Rc<RefCell<T>> {
    fn get(&self, key: &str) -> Option<String> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.borrow_mut().set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_backend_sees_all_writes() {
        let shared = Rc::new(RefCell::new(MemoryStore::new()));
        let mut first = Rc::clone(&shared);
        let mut second = Rc::clone(&shared);

        first.set("orders", "[]".to_string());
        second.set("orders", "[\"id\"]".to_string());

        assert_eq!(shared.get("orders").as_deref(), Some("[\"id\"]"));
        assert_eq!(shared.borrow().writes(), 2);
    }
}
