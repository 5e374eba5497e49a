use crate::domain::{
    models::attendee::{Attendee, AttendeeUploadRow},
    ports::AttendeeRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteAttendeeRepo {
    pool: SqlitePool,
}

impl SqliteAttendeeRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const ATTENDEE_COLUMNS: &str =
    "id, email, first_name, last_name, checked_in_at, assigned_code, email_sent, created_at";

#[async_trait]
impl AttendeeRepository for SqliteAttendeeRepo {
    async fn replace_all(&self, rows: &[AttendeeUploadRow]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM attendees")
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let now = Utc::now();
        for row in rows {
            sqlx::query(
                "INSERT INTO attendees (email, first_name, last_name, checked_in_at, email_sent, created_at) VALUES (?, ?, ?, ?, FALSE, ?)",
            )
                .bind(&row.email)
                .bind(&row.first_name)
                .bind(&row.last_name)
                .bind(&row.checked_in_at)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(rows.len() as u64)
    }

    async fn list_all(&self) -> Result<Vec<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {} FROM attendees ORDER BY id ASC",
            ATTENDEE_COLUMNS
        ))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_checked_in(&self) -> Result<Vec<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {} FROM attendees WHERE checked_in_at != '' ORDER BY id ASC",
            ATTENDEE_COLUMNS
        ))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn select_eligible(&self) -> Result<Vec<Attendee>, AppError> {
        // Mirrors Attendee::is_eligible. Kept equivalent by the stats parity
        // integration test.
        sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {} FROM attendees WHERE checked_in_at != '' AND assigned_code IS NOT NULL AND email_sent = FALSE ORDER BY id ASC",
            ATTENDEE_COLUMNS
        ))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn assign_code(&self, id: i64, code: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE attendees SET assigned_code = ? WHERE id = ?")
            .bind(code)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_sent(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE attendees SET email_sent = TRUE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Attendee not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM attendees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Attendee not found".into()));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM attendees")
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
