use axum::{
    extract::State, http::StatusCode, response::IntoResponse, Json,
};
use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        Description, DomainName, EmployeesCount, Website, WebsiteAPIError,
    },
    utils::{
        auth::AuthenticatedUser,
        website::{allocate_website_id, register_website},
    },
};

use super::WebsiteView;

#[tracing::instrument(name = "Add website", skip_all)]
pub async fn add_website(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<AddWebsiteRequest>,
) -> Result<impl IntoResponse, WebsiteAPIError> {
    let domain = DomainName::parse(&request.domain)?;
    let description = Description::parse(&request.description)?;
    let employees_count = EmployeesCount::parse(&request.employees_count)?;

    // Best-effort pre-check; the store's unique constraint decides
    // concurrent races inside register_website.
    let domain_taken = state
        .website_store
        .read()
        .await
        .domain_exists(&domain)
        .await
        .map_err(|e| WebsiteAPIError::UnexpectedError(eyre!(e)))?;
    if domain_taken {
        return Err(WebsiteAPIError::DuplicateDomain(
            domain.as_ref().to_string(),
        ));
    }

    let website_id = allocate_website_id(&state.website_store).await?;
    let website = Website::new(
        website_id,
        domain,
        description,
        employees_count,
        user.email.clone(),
    );

    let website = register_website(
        &state.website_store,
        &state.index_provisioner,
        website,
    )
    .await?;

    let response = Json(AddWebsiteResponse {
        message: format!(
            "Successfully added {}. Your website has been added to your \
             account and is ready to use.",
            website.domain.as_ref()
        ),
        website: WebsiteView::from_website(&website),
    });

    Ok((StatusCode::CREATED, response))
}

#[derive(Deserialize)]
pub struct AddWebsiteRequest {
    pub domain: String,
    pub description: String,
    #[serde(rename = "employeesCount")]
    pub employees_count: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AddWebsiteResponse {
    pub message: String,
    pub website: WebsiteView,
}
