//! MongoDB backed list store.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, ReplaceOptions};
use mongodb::{Client, Collection};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ListStore, StoreError};

/// Collection holding every persisted list.
const LISTS_COLLECTION: &str = "moderation_lists";

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if connection or the initial ping fails.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        Ok(Self {
            db: client.database(db_name),
        })
    }

    /// Get a typed collection from the database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Stored shape: `{ _id: <list name>, items: [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ListDocument<T> {
    #[serde(rename = "_id")]
    name: String,
    items: Vec<T>,
}

/// One named list stored as a single document.
pub struct MongoStore<T: Send + Sync> {
    collection: Collection<ListDocument<T>>,
    name: String,
}

impl<T> MongoStore<T>
where
    T: Send + Sync,
{
    pub fn new(db: &Database, name: impl Into<String>) -> Self {
        Self {
            collection: db.collection(LISTS_COLLECTION),
            name: name.into(),
        }
    }
}

#[async_trait]
impl<T> ListStore<T> for MongoStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Option<Vec<T>>, StoreError> {
        let filter = doc! { "_id": self.name.as_str() };
        let document = self.collection.find_one(filter).await?;
        Ok(document.map(|d| d.items))
    }

    async fn save(&self, items: &[T]) -> Result<(), StoreError> {
        let filter = doc! { "_id": self.name.as_str() };
        let document = ListDocument {
            name: self.name.clone(),
            items: items.to_vec(),
        };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(filter, &document)
            .with_options(options)
            .await?;

        debug!("Saved {} items to list '{}'", items.len(), self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{self, Bson};

    use super::*;

    #[test]
    fn test_list_document_shape() {
        let document = ListDocument {
            name: "whitelist".to_string(),
            items: vec![42_i64, -1002003004005],
        };

        let raw = bson::to_document(&document).unwrap();
        assert_eq!(raw.get_str("_id").unwrap(), "whitelist");
        assert_eq!(
            raw.get_array("items").unwrap(),
            &vec![Bson::Int64(42), Bson::Int64(-1002003004005)]
        );
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_list_document_reads_stored_keywords() {
        let raw = doc! { "_id": "keywords", "items": ["广告", "promo"] };
        let document: ListDocument<String> = bson::from_document(raw).unwrap();

        assert_eq!(document.name, "keywords");
        assert_eq!(document.items, vec!["广告", "promo"]);
    }
}
