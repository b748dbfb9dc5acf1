//! Document filing against existing cases.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::db::{CreateDocumentParams, Database, DocumentRecord};
use crate::registry::RegistryError;

/// File a document after verifying its case exists and the payload decodes
/// as base64.
pub async fn create_document(
    db: &dyn Database,
    params: CreateDocumentParams,
) -> Result<DocumentRecord, RegistryError> {
    if BASE64.decode(params.file_data.as_bytes()).is_err() {
        return Err(RegistryError::Validation(
            "file_data is not valid base64".to_string(),
        ));
    }
    if db.get_case(&params.case_id).await?.is_none() {
        return Err(RegistryError::NotFound("Case"));
    }
    Ok(db.create_document(&params).await?)
}

pub async fn delete_document(db: &dyn Database, document_id: &str) -> Result<(), RegistryError> {
    if !db.delete_document(document_id).await? {
        return Err(RegistryError::NotFound("Document"));
    }
    Ok(())
}
