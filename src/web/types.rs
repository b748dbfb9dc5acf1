//! Request and response DTOs for the registry API.

use serde::{Deserialize, Serialize};

use crate::db::{
    CaseStatus, CaseType, CreateCaseParams, CreateClientParams, CreateCourtDateParams,
    CreateDocumentParams, CreateUserParams, DocumentCategory, HearingPriority, UpdateCaseParams,
    UserRole,
};

/// Accepts RFC 3339 timestamps or naive ISO-8601 ones (taken as UTC).
///
/// The SPA and the original tooling send `datetime.utcnow().isoformat()`
/// values, which carry no offset.
pub(crate) mod lenient_datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Body returned by the delete endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
}

impl From<CreateUserRequest> for CreateUserParams {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            role: req.role,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<CreateClientRequest> for CreateClientParams {
    fn from(req: CreateClientRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            address: req.address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCaseRequest {
    pub case_number: String,
    pub title: String,
    pub case_type: CaseType,
    /// Defaults to `active` when omitted.
    #[serde(default)]
    pub status: CaseStatus,
    pub client_id: String,
    pub assigned_attorney: String,
    pub court_name: String,
    pub judge_name: Option<String>,
    pub description: Option<String>,
}

impl From<CreateCaseRequest> for CreateCaseParams {
    fn from(req: CreateCaseRequest) -> Self {
        Self {
            case_number: req.case_number,
            title: req.title,
            case_type: req.case_type,
            status: req.status,
            client_id: req.client_id,
            assigned_attorney: req.assigned_attorney,
            court_name: req.court_name,
            judge_name: req.judge_name,
            description: req.description,
        }
    }
}

/// Partial case update; omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCaseRequest {
    pub title: Option<String>,
    pub status: Option<CaseStatus>,
    pub assigned_attorney: Option<String>,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateCaseRequest> for UpdateCaseParams {
    fn from(req: UpdateCaseRequest) -> Self {
        Self {
            title: req.title,
            status: req.status,
            assigned_attorney: req.assigned_attorney,
            court_name: req.court_name,
            judge_name: req.judge_name,
            description: req.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCourtDateRequest {
    pub case_id: String,
    #[serde(deserialize_with = "lenient_datetime::deserialize")]
    pub date: chrono::DateTime<chrono::Utc>,
    pub court_name: String,
    pub judge_name: Option<String>,
    pub hearing_type: String,
    pub notes: Option<String>,
    /// Defaults to `medium` when omitted.
    #[serde(default)]
    pub priority: HearingPriority,
}

impl From<CreateCourtDateRequest> for CreateCourtDateParams {
    fn from(req: CreateCourtDateRequest) -> Self {
        Self {
            case_id: req.case_id,
            date: req.date,
            court_name: req.court_name,
            judge_name: req.judge_name,
            hearing_type: req.hearing_type,
            notes: req.notes,
            priority: req.priority,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub case_id: String,
    pub filename: String,
    pub category: DocumentCategory,
    /// Base64-encoded file content.
    pub file_data: String,
    pub file_type: String,
    pub uploaded_by: String,
}

impl From<CreateDocumentRequest> for CreateDocumentParams {
    fn from(req: CreateDocumentRequest) -> Self {
        Self {
            case_id: req.case_id,
            filename: req.filename,
            category: req.category,
            file_data: req.file_data,
            file_type: req.file_type,
            uploaded_by: req.uploaded_by,
        }
    }
}
