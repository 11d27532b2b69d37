use crate::domain::{models::customer::Customer, ports::CustomerRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCustomerRepo {
    pool: SqlitePool,
}

impl SqliteCustomerRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepo {
    async fn create(&self, customer: &Customer) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (id, name, email, phone, language, email_reminders, reminder_minutes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&customer.id).bind(&customer.name).bind(&customer.email).bind(&customer.phone)
            .bind(&customer.language).bind(customer.email_reminders).bind(&customer.reminder_minutes).bind(customer.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
