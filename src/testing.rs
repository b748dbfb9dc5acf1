//! Test support: an in-memory [`Database`] backend and record fixtures.
//!
//! The backend mirrors the MongoDB backend's observable behavior (id and
//! timestamp stamping, sort orders, result caps) so registry and handler
//! tests run without a cluster. Compiled only for tests and the
//! `test-support` feature used by the integration suite.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{
    CaseRecord, CaseStatus, CaseStore, CaseType, ClientRecord, ClientStore, CourtDateRecord,
    CourtDateStore, CreateCaseParams, CreateClientParams, CreateCourtDateParams,
    CreateDocumentParams, CreateUserParams, Database, DocumentCategory, DocumentRecord,
    DocumentStore, HearingPriority, LIST_RESULT_CAP, UpdateCaseParams, UserRecord, UserRole,
    UserStore,
};
use crate::error::DatabaseError;

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, UserRecord>,
    clients: HashMap<String, ClientRecord>,
    cases: HashMap<String, CaseRecord>,
    court_dates: HashMap<String, CourtDateRecord>,
    documents: HashMap<String, DocumentRecord>,
}

/// In-memory database backend for tests.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

/// Fresh, empty in-memory store.
pub fn memory_db() -> Arc<dyn Database> {
    Arc::new(MemoryBackend::default())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn capped<T>(mut rows: Vec<T>) -> Vec<T> {
    rows.truncate(LIST_RESULT_CAP as usize);
    rows
}

impl MemoryBackend {
    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl UserStore for MemoryBackend {
    async fn create_user(&self, input: &CreateUserParams) -> Result<UserRecord, DatabaseError> {
        let record = UserRecord {
            id: new_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            role: input.role,
            phone: input.phone.clone(),
            created_at: Utc::now(),
        };
        self.lock().users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, DatabaseError> {
        Ok(capped(self.lock().users.values().cloned().collect()))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, DatabaseError> {
        Ok(self.lock().users.get(user_id).cloned())
    }
}

#[async_trait]
impl ClientStore for MemoryBackend {
    async fn create_client(
        &self,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, DatabaseError> {
        let record = ClientRecord {
            id: new_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            created_at: Utc::now(),
        };
        self.lock()
            .clients
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, DatabaseError> {
        Ok(capped(self.lock().clients.values().cloned().collect()))
    }

    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, DatabaseError> {
        Ok(self.lock().clients.get(client_id).cloned())
    }

    async fn count_clients(&self) -> Result<u64, DatabaseError> {
        Ok(self.lock().clients.len() as u64)
    }
}

#[async_trait]
impl CaseStore for MemoryBackend {
    async fn create_case(&self, input: &CreateCaseParams) -> Result<CaseRecord, DatabaseError> {
        let now = Utc::now();
        let record = CaseRecord {
            id: new_id(),
            case_number: input.case_number.clone(),
            title: input.title.clone(),
            case_type: input.case_type,
            status: input.status,
            client_id: input.client_id.clone(),
            assigned_attorney: input.assigned_attorney.clone(),
            court_name: input.court_name.clone(),
            judge_name: input.judge_name.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        self.lock().cases.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_cases(&self) -> Result<Vec<CaseRecord>, DatabaseError> {
        let mut rows: Vec<CaseRecord> = self.lock().cases.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(capped(rows))
    }

    async fn get_case(&self, case_id: &str) -> Result<Option<CaseRecord>, DatabaseError> {
        Ok(self.lock().cases.get(case_id).cloned())
    }

    async fn update_case(
        &self,
        case_id: &str,
        input: &UpdateCaseParams,
    ) -> Result<Option<CaseRecord>, DatabaseError> {
        let mut state = self.lock();
        let Some(record) = state.cases.get_mut(case_id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            record.title = title.clone();
        }
        if let Some(status) = input.status {
            record.status = status;
        }
        if let Some(assigned_attorney) = &input.assigned_attorney {
            record.assigned_attorney = assigned_attorney.clone();
        }
        if let Some(court_name) = &input.court_name {
            record.court_name = court_name.clone();
        }
        if let Some(judge_name) = &input.judge_name {
            record.judge_name = Some(judge_name.clone());
        }
        if let Some(description) = &input.description {
            record.description = Some(description.clone());
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_case(&self, case_id: &str) -> Result<bool, DatabaseError> {
        Ok(self.lock().cases.remove(case_id).is_some())
    }

    async fn count_cases(&self) -> Result<u64, DatabaseError> {
        Ok(self.lock().cases.len() as u64)
    }

    async fn count_cases_with_status(&self, status: CaseStatus) -> Result<u64, DatabaseError> {
        Ok(self
            .lock()
            .cases
            .values()
            .filter(|case| case.status == status)
            .count() as u64)
    }
}

#[async_trait]
impl CourtDateStore for MemoryBackend {
    async fn create_court_date(
        &self,
        input: &CreateCourtDateParams,
    ) -> Result<CourtDateRecord, DatabaseError> {
        let record = CourtDateRecord {
            id: new_id(),
            case_id: input.case_id.clone(),
            date: input.date,
            court_name: input.court_name.clone(),
            judge_name: input.judge_name.clone(),
            hearing_type: input.hearing_type.clone(),
            notes: input.notes.clone(),
            priority: input.priority,
            created_at: Utc::now(),
        };
        self.lock()
            .court_dates
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_court_dates(&self) -> Result<Vec<CourtDateRecord>, DatabaseError> {
        let mut rows: Vec<CourtDateRecord> = self.lock().court_dates.values().cloned().collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(capped(rows))
    }

    async fn list_court_dates_for_case(
        &self,
        case_id: &str,
    ) -> Result<Vec<CourtDateRecord>, DatabaseError> {
        let mut rows: Vec<CourtDateRecord> = self
            .lock()
            .court_dates
            .values()
            .filter(|row| row.case_id == case_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(capped(rows))
    }

    async fn list_court_dates_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CourtDateRecord>, DatabaseError> {
        let mut rows: Vec<CourtDateRecord> = self
            .lock()
            .court_dates
            .values()
            .filter(|row| row.date >= start && row.date <= end)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn count_court_dates_from(&self, from: DateTime<Utc>) -> Result<u64, DatabaseError> {
        Ok(self
            .lock()
            .court_dates
            .values()
            .filter(|row| row.date >= from)
            .count() as u64)
    }

    async fn delete_court_date(&self, court_date_id: &str) -> Result<bool, DatabaseError> {
        Ok(self.lock().court_dates.remove(court_date_id).is_some())
    }

    async fn delete_court_dates_for_case(&self, case_id: &str) -> Result<u64, DatabaseError> {
        let mut state = self.lock();
        let before = state.court_dates.len();
        state.court_dates.retain(|_, row| row.case_id != case_id);
        Ok((before - state.court_dates.len()) as u64)
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create_document(
        &self,
        input: &CreateDocumentParams,
    ) -> Result<DocumentRecord, DatabaseError> {
        let record = DocumentRecord {
            id: new_id(),
            case_id: input.case_id.clone(),
            filename: input.filename.clone(),
            category: input.category,
            file_data: input.file_data.clone(),
            file_type: input.file_type.clone(),
            uploaded_by: input.uploaded_by.clone(),
            uploaded_at: Utc::now(),
        };
        self.lock()
            .documents
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_documents_for_case(
        &self,
        case_id: &str,
    ) -> Result<Vec<DocumentRecord>, DatabaseError> {
        let mut rows: Vec<DocumentRecord> = self
            .lock()
            .documents
            .values()
            .filter(|row| row.case_id == case_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(capped(rows))
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool, DatabaseError> {
        Ok(self.lock().documents.remove(document_id).is_some())
    }

    async fn delete_documents_for_case(&self, case_id: &str) -> Result<u64, DatabaseError> {
        let mut state = self.lock();
        let before = state.documents.len();
        state.documents.retain(|_, row| row.case_id != case_id);
        Ok((before - state.documents.len()) as u64)
    }
}

#[async_trait]
impl Database for MemoryBackend {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

// ==================== Fixtures ====================

pub fn sample_user_params() -> CreateUserParams {
    CreateUserParams {
        name: "John Attorney".to_string(),
        email: "john@law.example".to_string(),
        role: UserRole::Attorney,
        phone: Some("555-1234".to_string()),
    }
}

pub fn sample_client_params() -> CreateClientParams {
    CreateClientParams {
        name: "Client One".to_string(),
        email: Some("client1@example.com".to_string()),
        phone: Some("555-1111".to_string()),
        address: Some("123 Main St".to_string()),
    }
}

pub fn sample_case_params(client_id: &str, attorney_id: &str) -> CreateCaseParams {
    CreateCaseParams {
        case_number: "CV-2026-001".to_string(),
        title: "Smith v. Jones".to_string(),
        case_type: CaseType::Civil,
        status: CaseStatus::Active,
        client_id: client_id.to_string(),
        assigned_attorney: attorney_id.to_string(),
        court_name: "Superior Court".to_string(),
        judge_name: Some("Judge Wilson".to_string()),
        description: Some("Contract dispute".to_string()),
    }
}

pub fn sample_court_date_params(case_id: &str, date: DateTime<Utc>) -> CreateCourtDateParams {
    CreateCourtDateParams {
        case_id: case_id.to_string(),
        date,
        court_name: "Superior Court".to_string(),
        judge_name: Some("Judge Wilson".to_string()),
        hearing_type: "Status Conference".to_string(),
        notes: Some("Prepare status report".to_string()),
        priority: HearingPriority::Medium,
    }
}

pub fn sample_document_params(case_id: &str, uploaded_by: &str) -> CreateDocumentParams {
    CreateDocumentParams {
        case_id: case_id.to_string(),
        filename: "complaint.pdf".to_string(),
        category: DocumentCategory::Pleading,
        // "filing contents" in base64.
        file_data: "ZmlsaW5nIGNvbnRlbnRz".to_string(),
        file_type: "application/pdf".to_string(),
        uploaded_by: uploaded_by.to_string(),
    }
}
