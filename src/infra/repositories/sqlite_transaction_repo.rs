use crate::domain::{models::transaction::PaymentTransaction, ports::TransactionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTransactionRepo {
    pool: SqlitePool,
}

impl SqliteTransactionRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepo {
    async fn create(&self, transaction: &PaymentTransaction) -> Result<PaymentTransaction, AppError> {
        sqlx::query_as::<_, PaymentTransaction>(
            "INSERT INTO payment_transactions (id, booking_id, charge_id, amount, currency, status, payload, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&transaction.id).bind(&transaction.booking_id).bind(&transaction.charge_id)
            .bind(transaction.amount).bind(&transaction.currency).bind(&transaction.status)
            .bind(&transaction.payload).bind(transaction.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_charge(&self, charge_id: &str) -> Result<Option<PaymentTransaction>, AppError> {
        sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE charge_id = ? ORDER BY created_at DESC LIMIT 1"
        )
            .bind(charge_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<PaymentTransaction>, AppError> {
        sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE booking_id = ? ORDER BY created_at DESC"
        )
            .bind(booking_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_status(&self, charge_id: &str, status: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE payment_transactions SET status = ? WHERE charge_id = ?")
            .bind(status).bind(charge_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
