//! Persistence for the moderation lists.
//!
//! - `ListStore` - load/save contract for one persisted list
//! - `JsonFileStore` - human-readable JSON file, replaced atomically
//! - `MongoStore` - one document per list in MongoDB
//! - `SharedList` - in-memory snapshot owner backed by a `ListStore`

mod json;
mod mongo;
mod shared;

use std::path::PathBuf;

use async_trait::async_trait;

pub use json::JsonFileStore;
pub use mongo::{Database, MongoStore};
pub use shared::{BatchOutcome, SharedList};

/// Errors raised by list persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// A durable, ordered list of items.
#[async_trait]
pub trait ListStore<T>: Send + Sync {
    /// Load the list. `None` means it has never been saved.
    async fn load(&self) -> Result<Option<Vec<T>>, StoreError>;

    /// Replace the persisted list with `items`.
    async fn save(&self, items: &[T]) -> Result<(), StoreError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory store for tests.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::{ListStore, SharedList, StoreError};

    /// Keeps the last saved list in memory; saves fail while `fail` is set.
    pub struct MemoryStore<T> {
        pub saved: Mutex<Option<Vec<T>>>,
        pub fail: AtomicBool,
    }

    impl<T> Default for MemoryStore<T> {
        fn default() -> Self {
            Self {
                saved: Mutex::new(None),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl<T> ListStore<T> for MemoryStore<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        async fn load(&self) -> Result<Option<Vec<T>>, StoreError> {
            Ok(self.saved.lock().clone())
        }

        async fn save(&self, items: &[T]) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Io {
                    path: "memory".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            *self.saved.lock() = Some(items.to_vec());
            Ok(())
        }
    }

    /// A shared list seeded with `items`, backed by a fresh memory store.
    pub async fn shared_list<T>(items: Vec<T>) -> Arc<SharedList<T>>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let store = Arc::new(MemoryStore::<T>::default());
        let list = SharedList::load("test", store, items).await;
        match list {
            Ok(list) => Arc::new(list),
            Err(e) => panic!("memory store cannot fail on load: {e}"),
        }
    }
}
