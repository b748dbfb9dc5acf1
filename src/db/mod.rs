//! Storage abstraction layer.
//!
//! Provides a backend-agnostic [`Database`] trait that unifies all
//! persistence operations over the five registry collections. The
//! production implementation is [`mongo::MongoBackend`]; tests use the
//! in-memory backend from `crate::testing`.
//!
//! Backends stamp generated ids and timestamps at insert, so callers pass
//! `Create*Params` and get the full stored record back. Referential checks
//! and cascade ordering live one layer up, in `crate::registry`; the store
//! itself is plain per-collection CRUD with no cross-collection guarantees.

pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::error::DatabaseError;

/// Cap applied to every list query.
pub const LIST_RESULT_CAP: i64 = 1000;

/// Staff role within the practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Attorney,
    Judge,
    Clerk,
    Paralegal,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attorney => "attorney",
            Self::Judge => "judge",
            Self::Clerk => "clerk",
            Self::Paralegal => "paralegal",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "attorney" => Some(Self::Attorney),
            "judge" => Some(Self::Judge),
            "clerk" => Some(Self::Clerk),
            "paralegal" => Some(Self::Paralegal),
            _ => None,
        }
    }
}

/// Branch of law a case falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Civil,
    Criminal,
}

impl CaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Civil => "civil",
            Self::Criminal => "criminal",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "civil" => Some(Self::Civil),
            "criminal" => Some(Self::Criminal),
            _ => None,
        }
    }
}

/// Case lifecycle state. New cases default to `Active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Active,
    Pending,
    Closed,
    Settled,
    Dismissed,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Closed => "closed",
            Self::Settled => "settled",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "closed" => Some(Self::Closed),
            "settled" => Some(Self::Settled),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }
}

/// Filing category for uploaded documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Pleading,
    Motion,
    Order,
    Evidence,
    Correspondence,
    Contract,
    Other,
}

impl DocumentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pleading => "pleading",
            Self::Motion => "motion",
            Self::Order => "order",
            Self::Evidence => "evidence",
            Self::Correspondence => "correspondence",
            Self::Contract => "contract",
            Self::Other => "other",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "pleading" => Some(Self::Pleading),
            "motion" => Some(Self::Motion),
            "order" => Some(Self::Order),
            "evidence" => Some(Self::Evidence),
            "correspondence" => Some(Self::Correspondence),
            "contract" => Some(Self::Contract),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Scheduling priority of a hearing. New court dates default to `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HearingPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl HearingPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateClientParams {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: String,
    pub case_number: String,
    pub title: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub client_id: String,
    pub assigned_attorney: String,
    pub court_name: String,
    pub judge_name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCaseParams {
    pub case_number: String,
    pub title: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub client_id: String,
    pub assigned_attorney: String,
    pub court_name: String,
    pub judge_name: Option<String>,
    pub description: Option<String>,
}

/// Partial update of a case. `None` fields are left untouched; there is no
/// way to clear an already-set optional field, matching the wire contract.
#[derive(Debug, Clone, Default)]
pub struct UpdateCaseParams {
    pub title: Option<String>,
    pub status: Option<CaseStatus>,
    pub assigned_attorney: Option<String>,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtDateRecord {
    pub id: String,
    pub case_id: String,
    pub date: DateTime<Utc>,
    pub court_name: String,
    pub judge_name: Option<String>,
    pub hearing_type: String,
    pub notes: Option<String>,
    pub priority: HearingPriority,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCourtDateParams {
    pub case_id: String,
    pub date: DateTime<Utc>,
    pub court_name: String,
    pub judge_name: Option<String>,
    pub hearing_type: String,
    pub notes: Option<String>,
    pub priority: HearingPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub case_id: String,
    pub filename: String,
    pub category: DocumentCategory,
    /// Base64-encoded file content.
    pub file_data: String,
    pub file_type: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDocumentParams {
    pub case_id: String,
    pub filename: String,
    pub category: DocumentCategory,
    pub file_data: String,
    pub file_type: String,
    pub uploaded_by: String,
}

// ==================== Sub-traits ====================
//
// Each sub-trait groups one collection's persistence methods. The `Database`
// supertrait combines them all, so handlers hold a single `Arc<dyn Database>`
// while leaf code can depend on a specific sub-trait.

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, input: &CreateUserParams) -> Result<UserRecord, DatabaseError>;
    async fn list_users(&self) -> Result<Vec<UserRecord>, DatabaseError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, DatabaseError>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn create_client(
        &self,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, DatabaseError>;
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, DatabaseError>;
    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, DatabaseError>;
    async fn count_clients(&self) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn create_case(&self, input: &CreateCaseParams) -> Result<CaseRecord, DatabaseError>;
    /// Newest first.
    async fn list_cases(&self) -> Result<Vec<CaseRecord>, DatabaseError>;
    async fn get_case(&self, case_id: &str) -> Result<Option<CaseRecord>, DatabaseError>;
    /// Merge only the supplied fields and refresh `updated_at`. Returns
    /// `None` when the case does not exist.
    async fn update_case(
        &self,
        case_id: &str,
        input: &UpdateCaseParams,
    ) -> Result<Option<CaseRecord>, DatabaseError>;
    /// Returns whether a case row was removed. Child records are untouched.
    async fn delete_case(&self, case_id: &str) -> Result<bool, DatabaseError>;
    async fn count_cases(&self) -> Result<u64, DatabaseError>;
    async fn count_cases_with_status(&self, status: CaseStatus) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait CourtDateStore: Send + Sync {
    async fn create_court_date(
        &self,
        input: &CreateCourtDateParams,
    ) -> Result<CourtDateRecord, DatabaseError>;
    /// Date ascending.
    async fn list_court_dates(&self) -> Result<Vec<CourtDateRecord>, DatabaseError>;
    /// Date ascending.
    async fn list_court_dates_for_case(
        &self,
        case_id: &str,
    ) -> Result<Vec<CourtDateRecord>, DatabaseError>;
    /// Court dates with `start <= date <= end`, date ascending, capped at
    /// `limit` rows.
    async fn list_court_dates_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CourtDateRecord>, DatabaseError>;
    async fn count_court_dates_from(&self, from: DateTime<Utc>) -> Result<u64, DatabaseError>;
    async fn delete_court_date(&self, court_date_id: &str) -> Result<bool, DatabaseError>;
    /// Returns the number of rows removed.
    async fn delete_court_dates_for_case(&self, case_id: &str) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(
        &self,
        input: &CreateDocumentParams,
    ) -> Result<DocumentRecord, DatabaseError>;
    /// Newest first.
    async fn list_documents_for_case(
        &self,
        case_id: &str,
    ) -> Result<Vec<DocumentRecord>, DatabaseError>;
    async fn delete_document(&self, document_id: &str) -> Result<bool, DatabaseError>;
    /// Returns the number of rows removed.
    async fn delete_documents_for_case(&self, case_id: &str) -> Result<u64, DatabaseError>;
}

/// Backend-agnostic database supertrait.
#[async_trait]
pub trait Database:
    UserStore + ClientStore + CaseStore + CourtDateStore + DocumentStore + Send + Sync
{
    /// Round-trip the backend once to verify connectivity at startup.
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Connect the MongoDB backend from configuration and verify it responds.
pub async fn connect_from_config(
    config: &ServiceConfig,
) -> Result<Arc<dyn Database>, DatabaseError> {
    let backend = mongo::MongoBackend::connect(config).await?;
    backend.ping().await?;
    Ok(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::{CaseStatus, CaseType, DocumentCategory, HearingPriority, UserRole};

    #[test]
    fn enum_db_values_round_trip() {
        for role in [
            UserRole::Attorney,
            UserRole::Judge,
            UserRole::Clerk,
            UserRole::Paralegal,
        ] {
            assert_eq!(UserRole::from_db_value(role.as_str()), Some(role));
        }
        for status in [
            CaseStatus::Active,
            CaseStatus::Pending,
            CaseStatus::Closed,
            CaseStatus::Settled,
            CaseStatus::Dismissed,
        ] {
            assert_eq!(CaseStatus::from_db_value(status.as_str()), Some(status));
        }
        for category in [
            DocumentCategory::Pleading,
            DocumentCategory::Motion,
            DocumentCategory::Order,
            DocumentCategory::Evidence,
            DocumentCategory::Correspondence,
            DocumentCategory::Contract,
            DocumentCategory::Other,
        ] {
            assert_eq!(
                DocumentCategory::from_db_value(category.as_str()),
                Some(category)
            );
        }
        for priority in [
            HearingPriority::Low,
            HearingPriority::Medium,
            HearingPriority::High,
            HearingPriority::Urgent,
        ] {
            assert_eq!(
                HearingPriority::from_db_value(priority.as_str()),
                Some(priority)
            );
        }
        assert_eq!(CaseType::from_db_value("civil"), Some(CaseType::Civil));
        assert_eq!(CaseType::from_db_value("criminal"), Some(CaseType::Criminal));
    }

    #[test]
    fn unknown_db_values_are_rejected() {
        assert_eq!(UserRole::from_db_value("janitor"), None);
        assert_eq!(CaseStatus::from_db_value("reopened"), None);
        assert_eq!(CaseType::from_db_value("family"), None);
        assert_eq!(DocumentCategory::from_db_value("memo"), None);
        assert_eq!(HearingPriority::from_db_value("critical"), None);
    }

    #[test]
    fn defaults_match_create_semantics() {
        assert_eq!(CaseStatus::default(), CaseStatus::Active);
        assert_eq!(HearingPriority::default(), HearingPriority::Medium);
    }
}
