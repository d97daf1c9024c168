//! Profiles repository

use reqwest::header::ACCEPT;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::profile::UserProfile,
};

use super::{
    auth::{current_token, SessionHandle},
    client::check,
    RestClient,
};

/// Makes the data endpoint answer with one object instead of an array
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Clone)]
pub struct ProfilesRepository {
    client: RestClient,
    session: SessionHandle,
}

impl ProfilesRepository {
    pub fn new(client: RestClient, session: SessionHandle) -> Self {
        Self { client, session }
    }

    /// Get profile by user ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<UserProfile> {
        let token = current_token(&self.session);
        let id_filter = format!("eq.{}", id);
        let response = self
            .client
            .table("profiles", token.as_deref())
            .header(ACCEPT, SINGLE_OBJECT)
            .query(&[("select", "*"), ("id", id_filter.as_str())])
            .send()
            .await?;

        match check(response).await {
            Ok(response) => Ok(response.json().await?),
            // 406 is how a single-object request reports zero matching rows
            Err(AppError::Remote { status: 406, .. }) => {
                Err(AppError::NotFound(format!("Profile with id {} not found", id)))
            }
            Err(e) => Err(e),
        }
    }
}
