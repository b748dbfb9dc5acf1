//! Court date scheduling against existing cases.

use crate::db::{CourtDateRecord, CreateCourtDateParams, Database};
use crate::registry::RegistryError;

/// Schedule a court date after verifying its case exists.
pub async fn create_court_date(
    db: &dyn Database,
    params: CreateCourtDateParams,
) -> Result<CourtDateRecord, RegistryError> {
    if db.get_case(&params.case_id).await?.is_none() {
        return Err(RegistryError::NotFound("Case"));
    }
    Ok(db.create_court_date(&params).await?)
}

pub async fn delete_court_date(
    db: &dyn Database,
    court_date_id: &str,
) -> Result<(), RegistryError> {
    if !db.delete_court_date(court_date_id).await? {
        return Err(RegistryError::NotFound("Court date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use crate::registry::RegistryError;
    use crate::testing::{
        memory_db, sample_case_params, sample_client_params, sample_court_date_params,
        sample_user_params,
    };

    use super::{create_court_date, delete_court_date};

    #[tokio::test]
    async fn create_rejects_missing_case() {
        let db = memory_db();
        let err = create_court_date(db.as_ref(), sample_court_date_params("missing", Utc::now()))
            .await
            .expect_err("case check should fail");

        assert!(matches!(err, RegistryError::NotFound("Case")));
        assert!(db.list_court_dates().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn create_and_delete_round_trip() {
        let db = memory_db();
        let client = db
            .create_client(&sample_client_params())
            .await
            .expect("create client");
        let attorney = db
            .create_user(&sample_user_params())
            .await
            .expect("create attorney");
        let case = db
            .create_case(&sample_case_params(&client.id, &attorney.id))
            .await
            .expect("create case");

        let court_date = create_court_date(
            db.as_ref(),
            sample_court_date_params(&case.id, Utc::now()),
        )
        .await
        .expect("create court date");
        assert_eq!(court_date.case_id, case.id);

        delete_court_date(db.as_ref(), &court_date.id)
            .await
            .expect("delete court date");
        assert!(db.list_court_dates().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let db = memory_db();
        let err = delete_court_date(db.as_ref(), "missing")
            .await
            .expect_err("delete of absent court date");
        assert!(matches!(err, RegistryError::NotFound("Court date")));
    }
}
