use crate::domain::{
    models::sent_email::{NewSentEmail, SentEmail},
    ports::SentEmailRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSentEmailRepo {
    pool: SqlitePool,
}

impl SqliteSentEmailRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SentEmailRepository for SqliteSentEmailRepo {
    async fn append(&self, record: &NewSentEmail) -> Result<SentEmail, AppError> {
        sqlx::query_as::<_, SentEmail>(
            "INSERT INTO sent_emails (email, first_name, last_name, redemption_link, event_name, checked_in_at, sent_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id, email, first_name, last_name, redemption_link, event_name, checked_in_at, sent_at",
        )
            .bind(&record.email)
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(&record.redemption_link)
            .bind(&record.event_name)
            .bind(&record.checked_in_at)
            .bind(record.sent_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_newest_first(&self) -> Result<Vec<SentEmail>, AppError> {
        sqlx::query_as::<_, SentEmail>(
            "SELECT id, email, first_name, last_name, redemption_link, event_name, checked_in_at, sent_at FROM sent_emails ORDER BY sent_at DESC, id DESC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sent_emails")
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
