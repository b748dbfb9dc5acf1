//! Case lifecycle: creation with referential checks, partial update, and
//! the cascade delete.

use crate::db::{CaseRecord, CreateCaseParams, Database, UpdateCaseParams};
use crate::registry::RegistryError;

/// Create a case after verifying both referenced entities exist.
///
/// Checks run before the insert, so a failed check leaves no partial write.
pub async fn create_case(
    db: &dyn Database,
    params: CreateCaseParams,
) -> Result<CaseRecord, RegistryError> {
    if db.get_client(&params.client_id).await?.is_none() {
        return Err(RegistryError::NotFound("Client"));
    }
    if db.get_user(&params.assigned_attorney).await?.is_none() {
        return Err(RegistryError::NotFound("Attorney"));
    }
    Ok(db.create_case(&params).await?)
}

/// Apply a partial update to a case.
///
/// Only supplied fields change; `updated_at` is always refreshed. Unlike
/// creation, a changed `assigned_attorney` is accepted without an existence
/// check.
pub async fn update_case(
    db: &dyn Database,
    case_id: &str,
    params: UpdateCaseParams,
) -> Result<CaseRecord, RegistryError> {
    db.update_case(case_id, &params)
        .await?
        .ok_or(RegistryError::NotFound("Case"))
}

/// Delete a case together with its court dates and documents.
///
/// The three deletes are independent store calls in a fixed order (case,
/// then court dates, then documents); a crash in between leaves orphaned
/// child rows. Child counts are logged but not checked; only the absence
/// of the case itself is an error.
pub async fn delete_case(db: &dyn Database, case_id: &str) -> Result<(), RegistryError> {
    if !db.delete_case(case_id).await? {
        return Err(RegistryError::NotFound("Case"));
    }
    let court_dates = db.delete_court_dates_for_case(case_id).await?;
    let documents = db.delete_documents_for_case(case_id).await?;
    tracing::debug!(case_id, court_dates, documents, "cascade removed child records");
    Ok(())
}
