//! Key-value storage backends
//!
//! The engine only needs to put and fetch JSON strings by key. Browsers
//! get LocalStorage, native builds get one file per key.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;

/// Minimal string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::KeyValueStore;
    use crate::error::Result;

    /// Directory of `<key>.json` files
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        /// Open (creating if needed) a store rooted at `dir`
        pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
            let dir = dir.into();
            fs::create_dir_all(&dir)?;
            Ok(Self { dir })
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn path(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.json"))
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            match fs::read_to_string(self.path(key)) {
                Ok(s) => Ok(Some(s)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            // tmp → rename so a crash never leaves a half-written record
            let path = self.path(key);
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, value)?;
            fs::rename(&tmp, &path)?;
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            match fs::remove_file(self.path(key)) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::KeyValueStore;
    use crate::error::{GameError, Result};

    /// Browser LocalStorage
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LocalStorage;

    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| unavailable("LocalStorage not available"))
    }

    fn unavailable(msg: &str) -> GameError {
        GameError::Storage(std::io::Error::other(msg.to_string()))
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            storage()?
                .get_item(key)
                .map_err(|_| unavailable("LocalStorage read failed"))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            storage()?
                .set_item(key, value)
                .map_err(|_| unavailable("LocalStorage write failed"))
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            storage()?
                .remove_item(key)
                .map_err(|_| unavailable("LocalStorage remove failed"))
        }
    }
}
