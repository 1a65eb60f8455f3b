//! Contact endpoints
//!
//! Success bodies for mutations are plain text; reads are JSON.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ContactBody, ContactId};
use crate::http::server::AppState;
use crate::models::Contact;

/// GET /contacts - every stored contact
async fn list_contacts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = state.contacts.list().await?;
    Ok(Json(contacts))
}

/// POST /contacts - create a contact, `type` optional
async fn create_contact(
    State(state): State<Arc<AppState>>,
    ContactBody(draft): ContactBody,
) -> Result<(StatusCode, String), ApiError> {
    let contact = draft.validate_new()?;
    let id = state.contacts.create(contact).await?;

    tracing::info!(id, "contact created");
    Ok((StatusCode::CREATED, format!("Contact added with ID: {}", id)))
}

/// GET /contacts/{id}
async fn get_contact(
    State(state): State<Arc<AppState>>,
    ContactId(id): ContactId,
) -> Result<Json<Contact>, ApiError> {
    let contact = state.contacts.get(id).await?;
    Ok(Json(contact))
}

/// PUT /contacts/{id} - full replace
async fn update_contact(
    State(state): State<Arc<AppState>>,
    ContactId(id): ContactId,
    ContactBody(draft): ContactBody,
) -> Result<String, ApiError> {
    let contact = draft.validate_replacement()?;
    state.contacts.update(id, contact).await?;

    tracing::info!(id, "contact modified");
    Ok(format!("Contact modified with ID: {}", id))
}

/// DELETE /contacts/{id}
async fn delete_contact(
    State(state): State<Arc<AppState>>,
    ContactId(id): ContactId,
) -> Result<String, ApiError> {
    state.contacts.delete(id).await?;

    tracing::info!(id, "contact deleted");
    Ok(format!("Contact deleted with ID: {}", id))
}

/// Contact routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}
