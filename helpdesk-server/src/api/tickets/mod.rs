//! Ticket Routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/tickets | GET | Tickets visible to the caller, newest first |
//! | /api/tickets | POST | Create (multipart, up to 5 `images`) |
//! | /api/tickets/{id} | GET | One ticket |
//! | /api/tickets/{id} | PUT | Partial update |
//! | /api/tickets/{id} | DELETE | Permanent delete |
//! | /api/tickets/{id}/responses | POST | Append a response |

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/tickets", get(handler::list).post(handler::create))
        .route(
            "/api/tickets/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/api/tickets/{id}/responses", post(handler::add_response))
}
