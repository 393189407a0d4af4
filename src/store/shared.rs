//! Shared, read-mostly list with durable writes.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::info;

use super::{ListStore, StoreError};

/// Result of a batch insert or remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<T> {
    /// Items that were inserted or removed.
    pub changed: Vec<T>,
    /// Items left as they were (already present, or not found).
    pub unchanged: Vec<T>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            changed: Vec::new(),
            unchanged: Vec::new(),
        }
    }
}

/// An ordered, de-duplicated list shared between readers and admin writers.
///
/// Readers clone an `Arc` snapshot and never see a half-applied batch.
/// Writers are serialized, persist the new list first and publish it only
/// after the save succeeded, so a failed save leaves memory untouched.
pub struct SharedList<T> {
    name: &'static str,
    items: RwLock<Arc<Vec<T>>>,
    write_gate: Mutex<()>,
    store: Arc<dyn ListStore<T>>,
}

impl<T> SharedList<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Load the list from `store`, seeding it with `defaults` on first run.
    pub async fn load(
        name: &'static str,
        store: Arc<dyn ListStore<T>>,
        defaults: Vec<T>,
    ) -> Result<Self, StoreError> {
        let items = match store.load().await? {
            Some(items) => dedup(items),
            None => {
                info!("No stored {} list, seeding {} defaults", name, defaults.len());
                let defaults = dedup(defaults);
                store.save(&defaults).await?;
                defaults
            }
        };

        info!("Loaded {} {} entries", items.len(), name);

        Ok(Self {
            name,
            items: RwLock::new(Arc::new(items)),
            write_gate: Mutex::new(()),
            store,
        })
    }

    /// Consistent view of the current entries.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.items.read())
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.read().contains(item)
    }

    /// Append every item not already present.
    pub async fn insert_many(
        &self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<BatchOutcome<T>, StoreError> {
        let _guard = self.write_gate.lock().await;

        let mut next = Vec::clone(&self.snapshot());
        let mut outcome = BatchOutcome::default();

        for item in items {
            if next.contains(&item) {
                outcome.unchanged.push(item);
            } else {
                next.push(item.clone());
                outcome.changed.push(item);
            }
        }

        self.publish(next, &outcome).await?;
        Ok(outcome)
    }

    /// Remove every listed item that is present.
    pub async fn remove_many(
        &self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<BatchOutcome<T>, StoreError> {
        let _guard = self.write_gate.lock().await;

        let mut next = Vec::clone(&self.snapshot());
        let mut outcome = BatchOutcome::default();

        for item in items {
            match next.iter().position(|existing| *existing == item) {
                Some(index) => {
                    next.remove(index);
                    outcome.changed.push(item);
                }
                None => outcome.unchanged.push(item),
            }
        }

        self.publish(next, &outcome).await?;
        Ok(outcome)
    }

    async fn publish(&self, next: Vec<T>, outcome: &BatchOutcome<T>) -> Result<(), StoreError> {
        if outcome.changed.is_empty() {
            return Ok(());
        }

        self.store.save(&next).await?;
        *self.items.write() = Arc::new(next);

        info!(
            "{} list updated: {} changed, {} entries total",
            self.name,
            outcome.changed.len(),
            self.items.read().len()
        );
        Ok(())
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::store::testing::MemoryStore;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_seeds_defaults_once() {
        let store = Arc::new(MemoryStore::<String>::default());
        let list = SharedList::load("keyword", store.clone(), strings(&["ad", "ad", "promo"]))
            .await
            .unwrap();

        assert_eq!(*list.snapshot(), strings(&["ad", "promo"]));
        assert_eq!(*store.saved.lock(), Some(strings(&["ad", "promo"])));
    }

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let store = Arc::new(MemoryStore::<String>::default());
        let list = SharedList::load("keyword", store, strings(&["ad"])).await.unwrap();

        let outcome = list.insert_many(strings(&["sale", "ad", "sale"])).await.unwrap();
        assert_eq!(outcome.changed, strings(&["sale"]));
        assert_eq!(outcome.unchanged, strings(&["ad", "sale"]));

        let again = list.insert_many(strings(&["sale"])).await.unwrap();
        assert!(again.changed.is_empty());
        assert_eq!(*list.snapshot(), strings(&["ad", "sale"]));
    }

    #[tokio::test]
    async fn test_remove_reports_missing() {
        let store = Arc::new(MemoryStore::<String>::default());
        let list = SharedList::load("keyword", store.clone(), strings(&["ad", "promo"]))
            .await
            .unwrap();

        let outcome = list.remove_many(strings(&["promo", "ghost"])).await.unwrap();
        assert_eq!(outcome.changed, strings(&["promo"]));
        assert_eq!(outcome.unchanged, strings(&["ghost"]));
        assert_eq!(*store.saved.lock(), Some(strings(&["ad"])));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_intact() {
        let store = Arc::new(MemoryStore::<String>::default());
        let list = SharedList::load("keyword", store.clone(), strings(&["ad"])).await.unwrap();
        let before = list.snapshot();

        store.fail.store(true, Ordering::SeqCst);
        assert!(list.insert_many(strings(&["sale"])).await.is_err());

        assert_eq!(list.snapshot(), before);
        assert!(!list.contains(&"sale".to_string()));
    }

    #[tokio::test]
    async fn test_snapshot_is_stable_across_writes() {
        let store = Arc::new(MemoryStore::<String>::default());
        let list = SharedList::load("keyword", store, strings(&["ad"])).await.unwrap();

        let old = list.snapshot();
        list.insert_many(strings(&["a", "b", "c"])).await.unwrap();

        assert_eq!(*old, strings(&["ad"]));
        assert_eq!(list.snapshot().len(), 4);
    }
}
