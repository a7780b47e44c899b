use crate::db_storage::CustomerStorage;
use crate::errors::AppError;
use crate::models::{validate, Customer, CustomerCandidate};
use std::sync::Arc;
use uuid::Uuid;

/// Parses a record identifier before any storage access.
///
/// Any standard UUID text form is accepted; surrounding whitespace is ignored.
pub fn parse_customer_id(raw: &str) -> Result<Uuid, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidIdentifier(raw.to_string()));
    }
    Uuid::try_parse(trimmed).map_err(|_| AppError::InvalidIdentifier(raw.to_string()))
}

/// Collection and item operations over customer records.
#[derive(Clone)]
pub struct CustomerService {
    storage: Arc<dyn CustomerStorage>,
}

impl CustomerService {
    pub fn new(storage: Arc<dyn CustomerStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn CustomerStorage> {
        &self.storage
    }

    /// All customers, newest first. An empty store yields an empty list.
    pub async fn list_all(&self) -> Result<Vec<Customer>, AppError> {
        let customers = self.storage.list_all().await?;
        tracing::debug!("Listed {} customers", customers.len());
        Ok(customers)
    }

    /// Validates and stores a new customer.
    pub async fn create(&self, candidate: &CustomerCandidate) -> Result<Customer, AppError> {
        let fields = validate(candidate).map_err(|e| {
            tracing::debug!("Rejected customer candidate: {}", e);
            AppError::Validation(e)
        })?;

        let customer = self.storage.insert(fields).await?;
        tracing::info!(
            "Created customer {} (member number {})",
            customer.id,
            customer.member_number
        );
        Ok(customer)
    }

    pub async fn get_one(&self, id: &str) -> Result<Customer, AppError> {
        let id = parse_customer_id(id)?;
        self.storage
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))
    }

    /// Replaces all four mutable fields; a missing field fails validation as on create.
    pub async fn update_one(
        &self,
        id: &str,
        candidate: &CustomerCandidate,
    ) -> Result<Customer, AppError> {
        let id = parse_customer_id(id)?;
        let fields = validate(candidate)?;

        let customer = self
            .storage
            .update(id, fields)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))?;
        tracing::info!("Updated customer {}", customer.id);
        Ok(customer)
    }

    pub async fn delete_one(&self, id: &str) -> Result<(), AppError> {
        let id = parse_customer_id(id)?;
        if !self.storage.delete(id).await? {
            return Err(AppError::NotFound(format!(
                "Customer with id {} not found",
                id
            )));
        }
        tracing::info!("Deleted customer {}", id);
        Ok(())
    }
}
