//! Dashboard aggregation: headline counts and the upcoming-hearings feed.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::db::{CaseStatus, CourtDateRecord, Database};
use crate::registry::RegistryError;

/// Window scanned by the upcoming-hearings feed.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;
/// Row cap for the upcoming-hearings feed.
pub const UPCOMING_RESULT_CAP: i64 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_cases: u64,
    pub active_cases: u64,
    pub upcoming_court_dates: u64,
    pub total_clients: u64,
}

/// A court date in the upcoming feed, enriched with its parent case. The
/// enrichment fields stay unset when the parent case is gone.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingCourtDate {
    #[serde(flatten)]
    pub court_date: CourtDateRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
}

/// Headline counts, computed live against the store.
pub async fn stats(db: &dyn Database, now: DateTime<Utc>) -> Result<DashboardStats, RegistryError> {
    Ok(DashboardStats {
        total_cases: db.count_cases().await?,
        active_cases: db.count_cases_with_status(CaseStatus::Active).await?,
        upcoming_court_dates: db.count_court_dates_from(now).await?,
        total_clients: db.count_clients().await?,
    })
}

/// Court dates in the next [`UPCOMING_WINDOW_DAYS`] days, date ascending,
/// capped at [`UPCOMING_RESULT_CAP`] rows, each joined with its case title
/// and number by individual lookup.
pub async fn upcoming_court_dates(
    db: &dyn Database,
    now: DateTime<Utc>,
) -> Result<Vec<UpcomingCourtDate>, RegistryError> {
    let window_end = now + Duration::days(UPCOMING_WINDOW_DAYS);
    let court_dates = db
        .list_court_dates_between(now, window_end, UPCOMING_RESULT_CAP)
        .await?;

    let mut enriched = Vec::with_capacity(court_dates.len());
    for court_date in court_dates {
        let case = db.get_case(&court_date.case_id).await?;
        enriched.push(UpcomingCourtDate {
            case_title: case.as_ref().map(|c| c.title.clone()),
            case_number: case.map(|c| c.case_number),
            court_date,
        });
    }
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    use crate::db::{CaseStatus, UpdateCaseParams};
    use crate::testing::{
        memory_db, sample_case_params, sample_client_params, sample_court_date_params,
        sample_user_params,
    };

    use super::{UPCOMING_RESULT_CAP, stats, upcoming_court_dates};

    #[tokio::test]
    async fn stats_reflect_live_counts() {
        let db = memory_db();
        let now = Utc::now();
        let client = db
            .create_client(&sample_client_params())
            .await
            .expect("create client");
        let attorney = db
            .create_user(&sample_user_params())
            .await
            .expect("create attorney");

        let active = db
            .create_case(&sample_case_params(&client.id, &attorney.id))
            .await
            .expect("create case");
        let closed = db
            .create_case(&sample_case_params(&client.id, &attorney.id))
            .await
            .expect("create second case");
        db.update_case(
            &closed.id,
            &UpdateCaseParams {
                status: Some(CaseStatus::Closed),
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect("close case");

        // One hearing behind us, one ahead.
        db.create_court_date(&sample_court_date_params(
            &active.id,
            now - Duration::days(1),
        ))
        .await
        .expect("past court date");
        db.create_court_date(&sample_court_date_params(
            &active.id,
            now + Duration::days(3),
        ))
        .await
        .expect("future court date");

        let stats = stats(db.as_ref(), now).await.expect("stats");
        assert_eq!(stats.total_cases, 2);
        assert_eq!(stats.active_cases, 1);
        assert_eq!(stats.upcoming_court_dates, 1);
        assert_eq!(stats.total_clients, 1);
        assert!(stats.active_cases <= stats.total_cases);
    }

    #[tokio::test]
    async fn upcoming_respects_window_order_and_enrichment() {
        let db = memory_db();
        let now = Utc::now();
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

        // In-window hearings, inserted out of order.
        db.create_court_date(&sample_court_date_params(
            &case.id,
            now + Duration::days(14),
        ))
        .await
        .expect("later court date");
        db.create_court_date(&sample_court_date_params(&case.id, now + Duration::days(7)))
            .await
            .expect("earlier court date");
        // Outside the window on both sides.
        db.create_court_date(&sample_court_date_params(
            &case.id,
            now + Duration::days(45),
        ))
        .await
        .expect("too-far court date");
        db.create_court_date(&sample_court_date_params(&case.id, now - Duration::days(1)))
            .await
            .expect("past court date");

        let upcoming = upcoming_court_dates(db.as_ref(), now)
            .await
            .expect("upcoming");

        assert_eq!(upcoming.len(), 2);
        assert!(upcoming[0].court_date.date <= upcoming[1].court_date.date);
        for entry in &upcoming {
            assert_eq!(entry.case_title.as_deref(), Some(case.title.as_str()));
            assert_eq!(entry.case_number.as_deref(), Some(case.case_number.as_str()));
        }
    }

    #[tokio::test]
    async fn upcoming_omits_enrichment_for_orphaned_rows() {
        let db = memory_db();
        let now = Utc::now();
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
        db.create_court_date(&sample_court_date_params(&case.id, now + Duration::days(2)))
            .await
            .expect("create court date");

        // Remove only the case row, leaving the court date orphaned.
        assert!(db.delete_case(&case.id).await.expect("delete case"));

        let upcoming = upcoming_court_dates(db.as_ref(), now)
            .await
            .expect("upcoming");
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].case_title, None);
        assert_eq!(upcoming[0].case_number, None);
    }

    #[tokio::test]
    async fn upcoming_is_capped() {
        let db = memory_db();
        let now = Utc::now();
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

        for i in 0..(UPCOMING_RESULT_CAP + 5) {
            db.create_court_date(&sample_court_date_params(
                &case.id,
                now + Duration::hours(i + 1),
            ))
            .await
            .expect("create court date");
        }

        let upcoming = upcoming_court_dates(db.as_ref(), now)
            .await
            .expect("upcoming");
        assert_eq!(upcoming.len(), UPCOMING_RESULT_CAP as usize);
    }
}
