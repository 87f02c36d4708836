use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::Document;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel, error::Result};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

#[async_trait]
pub trait Repository<T> {
    async fn insert(&self, entity: &T) -> Result<()>;
    async fn find_one(&self, filter: Document) -> Result<Option<T>>;
    async fn query_sorted(&self, filter: Document, sort: Document) -> Result<Vec<T>>;
    /// 条件替换，返回替换后的文档；条件不匹配返回 None
    async fn replace_one(&self, filter: Document, entity: &T) -> Result<Option<T>>;
    async fn delete_one(&self, filter: Document) -> Result<u64>;
    async fn count(&self, filter: Document) -> Result<u64>;
    async fn ensure_index(&self, keys: Document, name: &str) -> Result<()>;
}

pub struct BaseRepository<T: Send + Sync> {
    pub collection: Collection<T>,
    _marker: PhantomData<T>,
}

impl<T: Send + Sync> BaseRepository<T> {
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection, _marker: Default::default() }
    }
}

#[async_trait]
impl<T> Repository<T> for BaseRepository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn insert(&self, entity: &T) -> Result<()> {
        self.collection.insert_one(entity).await?;
        Ok(())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        let result = self.collection.find_one(filter).await?;
        Ok(result)
    }

    async fn query_sorted(&self, filter: Document, sort: Document) -> Result<Vec<T>> {
        let mut cursor = self.collection.find(filter).sort(sort).await?;
        let mut result = vec![];
        while let Some(doc) = cursor.try_next().await? {
            result.push(doc);
        }
        Ok(result)
    }

    async fn replace_one(&self, filter: Document, entity: &T) -> Result<Option<T>> {
        let result = self.collection.find_one_and_replace(filter, entity).return_document(ReturnDocument::After).await?;
        Ok(result)
    }

    async fn delete_one(&self, filter: Document) -> Result<u64> {
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, filter: Document) -> Result<u64> {
        self.collection.count_documents(filter).await
    }

    async fn ensure_index(&self, keys: Document, name: &str) -> Result<()> {
        let options = IndexOptions::builder().name(name.to_string()).build();
        let model = IndexModel::builder().keys(keys).options(options).build();
        self.collection.create_index(model).await?;
        Ok(())
    }
}
