//! MongoDB backend for the Database trait.
//!
//! One collection per entity kind. Records are mapped to BSON documents by
//! hand so timestamps land as BSON datetimes (range queries on `date` must
//! compare chronologically, not lexically) and enum fields round-trip
//! through their `as_str`/`from_db_value` forms.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::Client;
use mongodb::bson::{Bson, DateTime as BsonDateTime, Document as BsonDocument, doc};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::db::{
    CaseRecord, CaseStatus, CaseStore, CaseType, ClientRecord, ClientStore, CourtDateRecord,
    CourtDateStore, CreateCaseParams, CreateClientParams, CreateCourtDateParams,
    CreateDocumentParams, CreateUserParams, Database, DocumentCategory, DocumentRecord,
    DocumentStore, HearingPriority, LIST_RESULT_CAP, UpdateCaseParams, UserRecord, UserRole,
    UserStore,
};
use crate::error::DatabaseError;

const COLLECTION_USERS: &str = "users";
const COLLECTION_CLIENTS: &str = "clients";
const COLLECTION_CASES: &str = "cases";
const COLLECTION_COURT_DATES: &str = "court_dates";
const COLLECTION_DOCUMENTS: &str = "documents";

/// MongoDB database backend.
pub struct MongoBackend {
    db: mongodb::Database,
}

impl MongoBackend {
    /// Connect to the cluster named by `MONGO_URL` and select `DB_NAME`.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(config.mongo_url.expose_secret())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(Self {
            db: client.database(&config.db_name),
        })
    }

    fn users(&self) -> mongodb::Collection<BsonDocument> {
        self.db.collection(COLLECTION_USERS)
    }

    fn clients(&self) -> mongodb::Collection<BsonDocument> {
        self.db.collection(COLLECTION_CLIENTS)
    }

    fn cases(&self) -> mongodb::Collection<BsonDocument> {
        self.db.collection(COLLECTION_CASES)
    }

    fn court_dates(&self) -> mongodb::Collection<BsonDocument> {
        self.db.collection(COLLECTION_COURT_DATES)
    }

    fn documents(&self) -> mongodb::Collection<BsonDocument> {
        self.db.collection(COLLECTION_DOCUMENTS)
    }
}

// ==================== BSON mapping ====================

fn opt_string_bson(value: &Option<String>) -> Bson {
    match value {
        Some(v) => Bson::String(v.clone()),
        None => Bson::Null,
    }
}

fn get_string(doc: &BsonDocument, key: &str) -> Result<String, DatabaseError> {
    doc.get_str(key)
        .map(str::to_string)
        .map_err(|e| DatabaseError::Decode(format!("field '{key}': {e}")))
}

fn get_opt_string(doc: &BsonDocument, key: &str) -> Option<String> {
    doc.get_str(key).ok().map(str::to_string)
}

fn get_datetime(doc: &BsonDocument, key: &str) -> Result<DateTime<Utc>, DatabaseError> {
    doc.get_datetime(key)
        .map(|dt| dt.to_chrono())
        .map_err(|e| DatabaseError::Decode(format!("field '{key}': {e}")))
}

fn get_enum<T>(
    doc: &BsonDocument,
    key: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, DatabaseError> {
    let raw = doc
        .get_str(key)
        .map_err(|e| DatabaseError::Decode(format!("field '{key}': {e}")))?;
    parse(raw).ok_or_else(|| DatabaseError::Decode(format!("unknown {key} value '{raw}'")))
}

fn user_to_doc(record: &UserRecord) -> BsonDocument {
    doc! {
        "id": record.id.as_str(),
        "name": record.name.as_str(),
        "email": record.email.as_str(),
        "role": record.role.as_str(),
        "phone": opt_string_bson(&record.phone),
        "created_at": BsonDateTime::from_chrono(record.created_at),
    }
}

fn doc_to_user(doc: &BsonDocument) -> Result<UserRecord, DatabaseError> {
    Ok(UserRecord {
        id: get_string(doc, "id")?,
        name: get_string(doc, "name")?,
        email: get_string(doc, "email")?,
        role: get_enum(doc, "role", UserRole::from_db_value)?,
        phone: get_opt_string(doc, "phone"),
        created_at: get_datetime(doc, "created_at")?,
    })
}

fn client_to_doc(record: &ClientRecord) -> BsonDocument {
    doc! {
        "id": record.id.as_str(),
        "name": record.name.as_str(),
        "email": opt_string_bson(&record.email),
        "phone": opt_string_bson(&record.phone),
        "address": opt_string_bson(&record.address),
        "created_at": BsonDateTime::from_chrono(record.created_at),
    }
}

fn doc_to_client(doc: &BsonDocument) -> Result<ClientRecord, DatabaseError> {
    Ok(ClientRecord {
        id: get_string(doc, "id")?,
        name: get_string(doc, "name")?,
        email: get_opt_string(doc, "email"),
        phone: get_opt_string(doc, "phone"),
        address: get_opt_string(doc, "address"),
        created_at: get_datetime(doc, "created_at")?,
    })
}

fn case_to_doc(record: &CaseRecord) -> BsonDocument {
    doc! {
        "id": record.id.as_str(),
        "case_number": record.case_number.as_str(),
        "title": record.title.as_str(),
        "case_type": record.case_type.as_str(),
        "status": record.status.as_str(),
        "client_id": record.client_id.as_str(),
        "assigned_attorney": record.assigned_attorney.as_str(),
        "court_name": record.court_name.as_str(),
        "judge_name": opt_string_bson(&record.judge_name),
        "description": opt_string_bson(&record.description),
        "created_at": BsonDateTime::from_chrono(record.created_at),
        "updated_at": BsonDateTime::from_chrono(record.updated_at),
    }
}

fn doc_to_case(doc: &BsonDocument) -> Result<CaseRecord, DatabaseError> {
    Ok(CaseRecord {
        id: get_string(doc, "id")?,
        case_number: get_string(doc, "case_number")?,
        title: get_string(doc, "title")?,
        case_type: get_enum(doc, "case_type", CaseType::from_db_value)?,
        status: get_enum(doc, "status", CaseStatus::from_db_value)?,
        client_id: get_string(doc, "client_id")?,
        assigned_attorney: get_string(doc, "assigned_attorney")?,
        court_name: get_string(doc, "court_name")?,
        judge_name: get_opt_string(doc, "judge_name"),
        description: get_opt_string(doc, "description"),
        created_at: get_datetime(doc, "created_at")?,
        updated_at: get_datetime(doc, "updated_at")?,
    })
}

fn court_date_to_doc(record: &CourtDateRecord) -> BsonDocument {
    doc! {
        "id": record.id.as_str(),
        "case_id": record.case_id.as_str(),
        "date": BsonDateTime::from_chrono(record.date),
        "court_name": record.court_name.as_str(),
        "judge_name": opt_string_bson(&record.judge_name),
        "hearing_type": record.hearing_type.as_str(),
        "notes": opt_string_bson(&record.notes),
        "priority": record.priority.as_str(),
        "created_at": BsonDateTime::from_chrono(record.created_at),
    }
}

fn doc_to_court_date(doc: &BsonDocument) -> Result<CourtDateRecord, DatabaseError> {
    Ok(CourtDateRecord {
        id: get_string(doc, "id")?,
        case_id: get_string(doc, "case_id")?,
        date: get_datetime(doc, "date")?,
        court_name: get_string(doc, "court_name")?,
        judge_name: get_opt_string(doc, "judge_name"),
        hearing_type: get_string(doc, "hearing_type")?,
        notes: get_opt_string(doc, "notes"),
        priority: get_enum(doc, "priority", HearingPriority::from_db_value)?,
        created_at: get_datetime(doc, "created_at")?,
    })
}

fn document_to_doc(record: &DocumentRecord) -> BsonDocument {
    doc! {
        "id": record.id.as_str(),
        "case_id": record.case_id.as_str(),
        "filename": record.filename.as_str(),
        "category": record.category.as_str(),
        "file_data": record.file_data.as_str(),
        "file_type": record.file_type.as_str(),
        "uploaded_by": record.uploaded_by.as_str(),
        "uploaded_at": BsonDateTime::from_chrono(record.uploaded_at),
    }
}

fn doc_to_document(doc: &BsonDocument) -> Result<DocumentRecord, DatabaseError> {
    Ok(DocumentRecord {
        id: get_string(doc, "id")?,
        case_id: get_string(doc, "case_id")?,
        filename: get_string(doc, "filename")?,
        category: get_enum(doc, "category", DocumentCategory::from_db_value)?,
        file_data: get_string(doc, "file_data")?,
        file_type: get_string(doc, "file_type")?,
        uploaded_by: get_string(doc, "uploaded_by")?,
        uploaded_at: get_datetime(doc, "uploaded_at")?,
    })
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ==================== Store impls ====================

#[async_trait]
impl UserStore for MongoBackend {
    async fn create_user(&self, input: &CreateUserParams) -> Result<UserRecord, DatabaseError> {
        let record = UserRecord {
            id: new_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            role: input.role,
            phone: input.phone.clone(),
            created_at: Utc::now(),
        };
        self.users().insert_one(user_to_doc(&record)).await?;
        Ok(record)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, DatabaseError> {
        let cursor = self.users().find(doc! {}).limit(LIST_RESULT_CAP).await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        docs.iter().map(doc_to_user).collect()
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let found = self.users().find_one(doc! { "id": user_id }).await?;
        found.as_ref().map(doc_to_user).transpose()
    }
}

#[async_trait]
impl ClientStore for MongoBackend {
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
        self.clients().insert_one(client_to_doc(&record)).await?;
        Ok(record)
    }

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, DatabaseError> {
        let cursor = self.clients().find(doc! {}).limit(LIST_RESULT_CAP).await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        docs.iter().map(doc_to_client).collect()
    }

    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, DatabaseError> {
        let found = self.clients().find_one(doc! { "id": client_id }).await?;
        found.as_ref().map(doc_to_client).transpose()
    }

    async fn count_clients(&self) -> Result<u64, DatabaseError> {
        Ok(self.clients().count_documents(doc! {}).await?)
    }
}

#[async_trait]
impl CaseStore for MongoBackend {
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
        self.cases().insert_one(case_to_doc(&record)).await?;
        Ok(record)
    }

    async fn list_cases(&self) -> Result<Vec<CaseRecord>, DatabaseError> {
        let cursor = self
            .cases()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(LIST_RESULT_CAP)
            .await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        docs.iter().map(doc_to_case).collect()
    }

    async fn get_case(&self, case_id: &str) -> Result<Option<CaseRecord>, DatabaseError> {
        let found = self.cases().find_one(doc! { "id": case_id }).await?;
        found.as_ref().map(doc_to_case).transpose()
    }

    async fn update_case(
        &self,
        case_id: &str,
        input: &UpdateCaseParams,
    ) -> Result<Option<CaseRecord>, DatabaseError> {
        let cases = self.cases();
        if cases.find_one(doc! { "id": case_id }).await?.is_none() {
            return Ok(None);
        }

        let mut update = doc! { "updated_at": BsonDateTime::from_chrono(Utc::now()) };
        if let Some(title) = &input.title {
            update.insert("title", title.as_str());
        }
        if let Some(status) = input.status {
            update.insert("status", status.as_str());
        }
        if let Some(assigned_attorney) = &input.assigned_attorney {
            update.insert("assigned_attorney", assigned_attorney.as_str());
        }
        if let Some(court_name) = &input.court_name {
            update.insert("court_name", court_name.as_str());
        }
        if let Some(judge_name) = &input.judge_name {
            update.insert("judge_name", judge_name.as_str());
        }
        if let Some(description) = &input.description {
            update.insert("description", description.as_str());
        }

        cases
            .update_one(doc! { "id": case_id }, doc! { "$set": update })
            .await?;
        let updated = cases.find_one(doc! { "id": case_id }).await?;
        updated.as_ref().map(doc_to_case).transpose()
    }

    async fn delete_case(&self, case_id: &str) -> Result<bool, DatabaseError> {
        let result = self.cases().delete_one(doc! { "id": case_id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_cases(&self) -> Result<u64, DatabaseError> {
        Ok(self.cases().count_documents(doc! {}).await?)
    }

    async fn count_cases_with_status(&self, status: CaseStatus) -> Result<u64, DatabaseError> {
        Ok(self
            .cases()
            .count_documents(doc! { "status": status.as_str() })
            .await?)
    }
}

#[async_trait]
impl CourtDateStore for MongoBackend {
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
        self.court_dates()
            .insert_one(court_date_to_doc(&record))
            .await?;
        Ok(record)
    }

    async fn list_court_dates(&self) -> Result<Vec<CourtDateRecord>, DatabaseError> {
        let cursor = self
            .court_dates()
            .find(doc! {})
            .sort(doc! { "date": 1 })
            .limit(LIST_RESULT_CAP)
            .await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        docs.iter().map(doc_to_court_date).collect()
    }

    async fn list_court_dates_for_case(
        &self,
        case_id: &str,
    ) -> Result<Vec<CourtDateRecord>, DatabaseError> {
        let cursor = self
            .court_dates()
            .find(doc! { "case_id": case_id })
            .sort(doc! { "date": 1 })
            .limit(LIST_RESULT_CAP)
            .await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        docs.iter().map(doc_to_court_date).collect()
    }

    async fn list_court_dates_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CourtDateRecord>, DatabaseError> {
        let filter = doc! {
            "date": {
                "$gte": BsonDateTime::from_chrono(start),
                "$lte": BsonDateTime::from_chrono(end),
            }
        };
        let cursor = self
            .court_dates()
            .find(filter)
            .sort(doc! { "date": 1 })
            .limit(limit)
            .await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        docs.iter().map(doc_to_court_date).collect()
    }

    async fn count_court_dates_from(&self, from: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let filter = doc! { "date": { "$gte": BsonDateTime::from_chrono(from) } };
        Ok(self.court_dates().count_documents(filter).await?)
    }

    async fn delete_court_date(&self, court_date_id: &str) -> Result<bool, DatabaseError> {
        let result = self
            .court_dates()
            .delete_one(doc! { "id": court_date_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_court_dates_for_case(&self, case_id: &str) -> Result<u64, DatabaseError> {
        let result = self
            .court_dates()
            .delete_many(doc! { "case_id": case_id })
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl DocumentStore for MongoBackend {
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
        self.documents()
            .insert_one(document_to_doc(&record))
            .await?;
        Ok(record)
    }

    async fn list_documents_for_case(
        &self,
        case_id: &str,
    ) -> Result<Vec<DocumentRecord>, DatabaseError> {
        let cursor = self
            .documents()
            .find(doc! { "case_id": case_id })
            .sort(doc! { "uploaded_at": -1 })
            .limit(LIST_RESULT_CAP)
            .await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        docs.iter().map(doc_to_document).collect()
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool, DatabaseError> {
        let result = self
            .documents()
            .delete_one(doc! { "id": document_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_documents_for_case(&self, case_id: &str) -> Result<u64, DatabaseError> {
        let result = self
            .documents()
            .delete_many(doc! { "case_id": case_id })
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl Database for MongoBackend {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(())
    }
}
