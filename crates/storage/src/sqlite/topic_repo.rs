use quiz_core::model::{Topic, TopicId};

use super::SqliteRepository;
use super::gateway::SqlParam;
use super::mapping::{id_i64, map_topic_row, topic_id_from_i64};
use crate::repository::{StorageError, TopicRepository};

#[async_trait::async_trait]
impl TopicRepository for SqliteRepository {
    async fn insert_topic(&self, name: &str) -> Result<Topic, StorageError> {
        let res = self
            .execute("INSERT INTO Topic (name) VALUES (?1)", &[name.into()])
            .await?;
        let id = topic_id_from_i64(res.last_insert_id)?;
        Topic::new(id, name).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn rename_topic(&self, id: TopicId, name: &str) -> Result<(), StorageError> {
        let res = self
            .execute(
                "UPDATE Topic SET name = ?1 WHERE id = ?2",
                &[name.into(), SqlParam::Int(id_i64("topic_id", id.value())?)],
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError> {
        let res = self
            .execute(
                "DELETE FROM Topic WHERE id = ?1",
                &[SqlParam::Int(id_i64("topic_id", id.value())?)],
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError> {
        self.fetch_first(
            "SELECT id, name FROM Topic WHERE id = ?1",
            &[SqlParam::Int(id_i64("topic_id", id.value())?)],
        )
        .await?
        .as_ref()
        .map(map_topic_row)
        .transpose()
    }

    async fn find_topic_by_name(&self, name: &str) -> Result<Option<Topic>, StorageError> {
        self.fetch_first("SELECT id, name FROM Topic WHERE name = ?1", &[name.into()])
            .await?
            .as_ref()
            .map(map_topic_row)
            .transpose()
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let rows = self
            .fetch_all("SELECT id, name FROM Topic ORDER BY id ASC", &[])
            .await?;

        let mut topics = Vec::with_capacity(rows.len());
        for row in rows {
            topics.push(map_topic_row(&row)?);
        }
        Ok(topics)
    }
}
