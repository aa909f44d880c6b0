//! Ticket API Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use http::StatusCode;
use shared::models::{DeletedTicket, ResponseCreate, TicketUpdate, TicketView};

use crate::api::json_body;
use crate::attachments::{MAX_ATTACHMENTS, Upload};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::tickets::{NewTicket, TicketDraft};
use crate::utils::error::multipart_error;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Multipart part name carrying image files
const IMAGES_FIELD: &str = "images";

/// GET /api/tickets
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<TicketView>>> {
    let tickets = state.tickets().list(&user).await?;
    Ok(Json(tickets))
}

/// GET /api/tickets/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<TicketView>> {
    let ticket = state.tickets().get(&user, &id).await?;
    Ok(Json(ticket))
}

/// POST /api/tickets (multipart)
///
/// Text fields are validated before any file is written; if the ticket
/// cannot be stored the written files are removed again.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<TicketView>)> {
    let (form, uploads) = read_ticket_form(multipart).await?;
    let draft = TicketDraft::parse(form)?;

    let store = state.attachments();
    let attachments = store.save_all(uploads).await?;

    match state.tickets().create(&user, draft, attachments.clone()).await {
        Ok(ticket) => Ok((StatusCode::CREATED, Json(ticket))),
        Err(e) => {
            store.discard(&attachments).await;
            Err(e)
        }
    }
}

/// PUT /api/tickets/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<TicketUpdate>, JsonRejection>,
) -> AppResult<Json<TicketView>> {
    let update = json_body(payload)?;
    let ticket = state.tickets().update(&user, &id, update).await?;
    Ok(Json(ticket))
}

/// DELETE /api/tickets/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedTicket>> {
    let deleted = state.tickets().delete(&user, &id).await?;
    Ok(Json(deleted))
}

/// POST /api/tickets/{id}/responses
pub async fn add_response(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<ResponseCreate>, JsonRejection>,
) -> AppResult<Json<TicketView>> {
    let body = json_body(payload)?;
    let ticket = state.tickets().add_response(&user, &id, &body.message).await?;
    Ok(Json(ticket))
}

/// Split a ticket form into text fields and image parts
async fn read_ticket_form(mut multipart: Multipart) -> AppResult<(NewTicket, Vec<Upload>)> {
    let mut form = NewTicket::default();
    let mut uploads: Vec<Upload> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGES_FIELD {
            if uploads.len() == MAX_ATTACHMENTS {
                return Err(AppError::with_message(
                    ErrorCode::TooManyAttachments,
                    format!("At most {} images per ticket", MAX_ATTACHMENTS),
                ));
            }
            let filename = field.file_name().unwrap_or("image").to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            uploads.push(Upload { filename, data });
            continue;
        }

        let slot = match name.as_str() {
            "title" => &mut form.title,
            "description" => &mut form.description,
            "category" => &mut form.category,
            "priority" => &mut form.priority,
            "resolutionDate" | "resolution_date" => &mut form.resolution_date,
            other => {
                tracing::debug!(field = %other, "Ignoring unknown ticket form field");
                continue;
            }
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    Ok((form, uploads))
}
