use std::{
    cmp::Ordering,
    collections::{btree_map::Entry, BTreeMap, HashMap},
    sync::RwLock,
};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Direction, Document, DocumentStore, Query, StoreError};

type Collection = BTreeMap<String, Value>;

/// Process-local store. Backs tests and runs without `DATABASE_URL`.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), body);
        Ok(())
    }

    async fn create(&self, collection: &str, id: &str, body: Value) -> Result<bool, StoreError> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
        {
            Entry::Vacant(slot) => {
                slot.insert(body);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut found: Vec<Document> = {
            let collections = self
                .collections
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            collections
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|(_, body)| query.matches(body))
                        .map(|(id, body)| Document {
                            id: id.clone(),
                            body: body.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Some((field, direction)) = &query.order_by {
            found.sort_by(|a, b| {
                let ord = compare_values(a.body.get(field), b.body.get(field));
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
