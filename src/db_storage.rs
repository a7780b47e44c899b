use crate::db::Database;
use crate::errors::{AppError, ResultExt};
use crate::models::{Customer, CustomerFields};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence for customer records.
///
/// Implementations assign `id`, `created_at` and `updated_at`, and must reject
/// a write whose member number already belongs to another record with
/// [`AppError::UniquenessConflict`].
#[async_trait]
pub trait CustomerStorage: Send + Sync {
    /// All customers, most recently created first.
    async fn list_all(&self) -> Result<Vec<Customer>, AppError>;

    async fn insert(&self, fields: CustomerFields) -> Result<Customer, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Customer>, AppError>;

    /// Overwrites the mutable fields; `None` when no record has this id.
    async fn update(&self, id: Uuid, fields: CustomerFields) -> Result<Option<Customer>, AppError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Whether the backing store is currently reachable without a new connect.
    fn is_ready(&self) -> bool {
        true
    }
}

// ============ PostgreSQL ============

const SELECT_COLUMNS: &str =
    "id, name, date_of_birth, member_number, interests, created_at, updated_at";

/// Database storage for customer records.
pub struct PgCustomerStorage {
    db: Arc<Database>,
}

impl PgCustomerStorage {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Maps a unique-constraint violation to a conflict on the given member number.
fn map_write_error(err: sqlx::Error, member_number: i64, context: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            tracing::info!(
                "Rejected write: member number {} already in use ({})",
                member_number,
                db_err.constraint().unwrap_or("unique constraint")
            );
            AppError::UniquenessConflict(member_number)
        }
        _ => AppError::WithContext {
            source: Box::new(AppError::DatabaseError(err)),
            context: context.to_string(),
        },
    }
}

#[async_trait]
impl CustomerStorage for PgCustomerStorage {
    async fn list_all(&self) -> Result<Vec<Customer>, AppError> {
        let pool = self.db.pool().await?;

        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&pool)
        .await
        .context("listing customers")
    }

    async fn insert(&self, fields: CustomerFields) -> Result<Customer, AppError> {
        let pool = self.db.pool().await?;

        sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers (id, name, date_of_birth, member_number, interests)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(fields.date_of_birth)
        .bind(fields.member_number)
        .bind(&fields.interests)
        .fetch_one(&pool)
        .await
        .map_err(|e| map_write_error(e, fields.member_number, "inserting customer"))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let pool = self.db.pool().await?;

        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&pool)
        .await
        .with_context(|| format!("loading customer {}", id))
    }

    async fn update(&self, id: Uuid, fields: CustomerFields) -> Result<Option<Customer>, AppError> {
        let pool = self.db.pool().await?;

        // now() is per transaction; updated_at must still strictly increase
        sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers
             SET name = $2,
                 date_of_birth = $3,
                 member_number = $4,
                 interests = $5,
                 updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
             WHERE id = $1
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(fields.date_of_birth)
        .bind(fields.member_number)
        .bind(&fields.interests)
        .fetch_optional(&pool)
        .await
        .map_err(|e| map_write_error(e, fields.member_number, "updating customer"))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let pool = self.db.pool().await?;

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .with_context(|| format!("deleting customer {}", id))?;

        Ok(result.rows_affected() > 0)
    }

    fn is_ready(&self) -> bool {
        self.db.is_connected()
    }
}

// ============ In-memory ============

#[derive(Default)]
struct MemoryState {
    customers: HashMap<Uuid, Customer>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Wall-clock time, nudged forward so that no two writes share a timestamp.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn member_number_taken(&self, member_number: i64, except: Option<Uuid>) -> bool {
        self.customers
            .values()
            .any(|c| c.member_number == member_number && Some(c.id) != except)
    }
}

/// Process-local storage with the same guarantees as the PostgreSQL backend.
#[derive(Default)]
pub struct InMemoryCustomerStorage {
    state: RwLock<MemoryState>,
}

impl InMemoryCustomerStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStorage for InMemoryCustomerStorage {
    async fn list_all(&self) -> Result<Vec<Customer>, AppError> {
        let state = self.state.read().await;
        let mut customers: Vec<Customer> = state.customers.values().cloned().collect();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    async fn insert(&self, fields: CustomerFields) -> Result<Customer, AppError> {
        let mut state = self.state.write().await;
        if state.member_number_taken(fields.member_number, None) {
            return Err(AppError::UniquenessConflict(fields.member_number));
        }

        let now = state.next_timestamp();
        let customer = Customer {
            id: Uuid::new_v4(),
            name: fields.name,
            date_of_birth: fields.date_of_birth,
            member_number: fields.member_number,
            interests: fields.interests,
            created_at: now,
            updated_at: now,
        };
        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self.state.read().await.customers.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, fields: CustomerFields) -> Result<Option<Customer>, AppError> {
        let mut state = self.state.write().await;
        if !state.customers.contains_key(&id) {
            return Ok(None);
        }
        if state.member_number_taken(fields.member_number, Some(id)) {
            return Err(AppError::UniquenessConflict(fields.member_number));
        }

        let now = state.next_timestamp();
        let Some(customer) = state.customers.get_mut(&id) else {
            return Ok(None);
        };
        customer.name = fields.name;
        customer.date_of_birth = fields.date_of_birth;
        customer.member_number = fields.member_number;
        customer.interests = fields.interests;
        customer.updated_at = now;
        Ok(Some(customer.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.state.write().await.customers.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fields(member_number: i64) -> CustomerFields {
        CustomerFields {
            name: "Ada".to_string(),
            date_of_birth: Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(),
            member_number,
            interests: "math".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_insert_assigns_storage_fields() {
        let storage = InMemoryCustomerStorage::new();
        let customer = storage.insert(fields(1)).await.unwrap();

        assert_ne!(customer.id, Uuid::nil());
        assert_eq!(customer.created_at, customer.updated_at);
        assert_eq!(storage.find(customer.id).await.unwrap(), Some(customer));
    }

    #[tokio::test]
    async fn test_memory_rejects_duplicate_member_number() {
        let storage = InMemoryCustomerStorage::new();
        let first = storage.insert(fields(5)).await.unwrap();

        let err = storage.insert(fields(5)).await.unwrap_err();
        assert!(matches!(err, AppError::UniquenessConflict(5)));

        let second = storage.insert(fields(6)).await.unwrap();
        let err = storage.update(second.id, fields(5)).await.unwrap_err();
        assert!(matches!(err, AppError::UniquenessConflict(5)));

        // Keeping your own number is not a conflict
        assert!(storage.update(first.id, fields(5)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_timestamps_strictly_increase() {
        let storage = InMemoryCustomerStorage::new();
        let a = storage.insert(fields(1)).await.unwrap();
        let b = storage.insert(fields(2)).await.unwrap();
        assert!(b.created_at > a.created_at);

        let updated = storage.update(a.id, fields(3)).await.unwrap().unwrap();
        assert!(updated.updated_at > a.updated_at);
        assert_eq!(updated.created_at, a.created_at);

        let listed = storage.list_all().await.unwrap();
        assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_memory_update_and_delete_missing() {
        let storage = InMemoryCustomerStorage::new();
        let missing = Uuid::new_v4();
        assert_eq!(storage.update(missing, fields(1)).await.unwrap(), None);
        assert!(!storage.delete(missing).await.unwrap());
    }
}
