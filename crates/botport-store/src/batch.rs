//! Multi-row inserts split to stay under the bind variable limit

use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, IntoActiveModel, TransactionTrait};
use tracing::{debug, warn};

use crate::connection::DbConnection;

/// Rows per `INSERT` statement. Every table here binds at most six columns,
/// which keeps a chunk far below the SQLite and Postgres limits.
pub(crate) const BATCH_SIZE: usize = 500;

/// Insert `models` in chunks of `BATCH_SIZE` inside one transaction, so the
/// whole batch is stored or none of it is
pub(crate) async fn insert_in_batches<A>(db: &DbConnection, models: Vec<A>) -> Result<u64, DbErr>
where
    A: ActiveModelTrait + Clone + Send + Sync,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    if models.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let mut inserted = 0;
    for chunk in models.chunks(BATCH_SIZE) {
        match A::Entity::insert_many(chunk.to_vec())
            .exec_without_returning(&txn)
            .await
        {
            Ok(rows) => inserted += rows,
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!("Failed to roll back batch insert: {}", rollback);
                }
                return Err(e);
            }
        }
    }
    txn.commit().await?;

    debug!("Inserted {} rows in batches of {}", inserted, BATCH_SIZE);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use botport_entities::activity;
    use sea_orm::{ActiveValue::Set, DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn utterance(id: usize) -> activity::ActiveModel {
        activity::ActiveModel {
            id: Set(format!("u{}", id)),
            project_id: Set("p1".to_string()),
            text: Set("hello".to_string()),
            language: Set(None),
            body: Set(json!({})),
            created_at: Set(chrono::Utc::now()),
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_large_batch_is_split_into_statements() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([exec(500), exec(500), exec(200)])
            .into_connection();

        let models = (0..1200).map(utterance).collect();
        let inserted = insert_in_batches(&db, models).await.unwrap();

        assert_eq!(inserted, 1200);
    }

    #[tokio::test]
    async fn test_failing_chunk_fails_the_batch() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([exec(500)])
            .append_exec_errors([DbErr::Custom("disk I/O error".to_string())])
            .into_connection();

        let models = (0..800).map(utterance).collect();
        let err = insert_in_batches(&db, models).await.unwrap_err();

        assert_eq!(err.to_string(), "Custom Error: disk I/O error");
    }

    #[tokio::test]
    async fn test_empty_batch_opens_no_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let inserted = insert_in_batches::<activity::ActiveModel>(&db, Vec::new())
            .await
            .unwrap();

        assert_eq!(inserted, 0);
    }
}
