use axum::{extract::State, response::IntoResponse, Json};
use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState, domain::WebsiteAPIError,
    utils::auth::AuthenticatedUser,
};

use super::WebsiteView;

#[tracing::instrument(name = "List websites", skip_all)]
pub async fn list_websites(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, WebsiteAPIError> {
    let websites = state
        .website_store
        .read()
        .await
        .websites_for_owner(&user.email)
        .await
        .map_err(|e| WebsiteAPIError::UnexpectedError(eyre!(e)))?;

    Ok(Json(ListWebsitesResponse {
        websites: websites.iter().map(WebsiteView::from_website).collect(),
    }))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ListWebsitesResponse {
    pub websites: Vec<WebsiteView>,
}
