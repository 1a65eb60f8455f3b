//! Contact repository - PostgreSQL
//!
//! One statement per operation against the `contacts` table:
//! - list/get: plain SELECT, no ordering clause
//! - create: INSERT ... RETURNING id
//! - update/delete: affected-row count decides between success and not found

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::{ContactStore, DbError};
use crate::models::{Contact, ContactType, NewContact};

/// Contact record as read from the table
#[derive(Debug, Clone, FromRow)]
struct ContactRow {
    id: i32,
    name: String,
    age: i32,
    email: String,
    phone: String,
    #[sqlx(rename = "type")]
    kind: String,
}

impl TryFrom<ContactRow> for Contact {
    type Error = DbError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<ContactType>().map_err(|e| DbError::Corrupt {
            resource: "contact",
            id: row.id.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Contact {
            id: row.id,
            name: row.name,
            age: row.age,
            email: row.email,
            phone: row.phone,
            kind,
        })
    }
}

/// Contact repository over an owned pool
#[derive(Debug, Clone)]
pub struct ContactRepo {
    pool: PgPool,
}

impl ContactRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContactStore for ContactRepo {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self) -> Result<Vec<Contact>, DbError> {
        let rows: Vec<ContactRow> =
            sqlx::query_as("SELECT id, name, age, email, phone, type FROM contacts")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Contact::try_from).collect()
    }

    async fn create(&self, contact: NewContact) -> Result<i32, DbError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO contacts (name, age, email, phone, type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&contact.name)
        .bind(contact.age)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id, "contact inserted");
        Ok(id)
    }

    async fn get(&self, id: i32) -> Result<Contact, DbError> {
        let row: ContactRow = sqlx::query_as(
            "SELECT id, name, age, email, phone, type FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::contact_not_found(id))?;

        Contact::try_from(row)
    }

    async fn update(&self, id: i32, contact: NewContact) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET name = $1, age = $2, email = $3, phone = $4, type = $5
            WHERE id = $6
            "#,
        )
        .bind(&contact.name)
        .bind(contact.age)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.kind.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::contact_not_found(id));
        }

        tracing::debug!(id, "contact updated");
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::contact_not_found(id));
        }

        tracing::debug!(id, "contact deleted");
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("closing database pool");
        self.pool.close().await;
    }
}
