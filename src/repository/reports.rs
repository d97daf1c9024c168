//! Reports repository: return history rows joined with their rental

use crate::{
    error::AppResult,
    models::report::{ReportType, ReturnRecord},
};

use super::{
    auth::{current_token, SessionHandle},
    client::check,
    RestClient,
};

/// Columns pulled from the joined `rentals` row
const RETURN_HISTORY_SELECT: &str = "*,rentals!inner(renter_name,rent_date,return_date)";

#[derive(Clone)]
pub struct ReportsRepository {
    client: RestClient,
    session: SessionHandle,
}

impl ReportsRepository {
    pub fn new(client: RestClient, session: SessionHandle) -> Self {
        Self { client, session }
    }

    /// All returned/missing/sold reports, newest first
    pub async fn return_history(&self) -> AppResult<Vec<ReturnRecord>> {
        let types = ReportType::HISTORY
            .iter()
            .map(ReportType::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let type_filter = format!("in.({})", types);

        let token = current_token(&self.session);
        let response = self
            .client
            .table("reports", token.as_deref())
            .query(&[
                ("select", RETURN_HISTORY_SELECT),
                ("type", type_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;

        let records: Vec<ReturnRecord> = check(response).await?.json().await?;
        tracing::debug!("Fetched {} return history rows", records.len());
        Ok(records)
    }
}
