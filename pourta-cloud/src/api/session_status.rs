//! Checkout session status
//!
//! GET /api/session-status?session_id=cs_...

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use shared::error::{AppError, ErrorCode};
use shared::util::non_blank;

use crate::error::ServiceResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    session_id: Option<String>,
    /// Accepted as an alias of `session_id`
    id: Option<String>,
}

impl SessionQuery {
    fn session_id(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .and_then(non_blank)
            .or_else(|| self.id.as_deref().and_then(non_blank))
    }
}

/// Return the processor's session object, PaymentIntent expanded
pub async fn session_status(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> ServiceResult<Json<serde_json::Value>> {
    let session_id = query
        .session_id()
        .ok_or_else(|| AppError::new(ErrorCode::SessionIdMissing))?;

    let session = state.stripe.retrieve_session(session_id).await?;
    Ok(Json(serde_json::json!({ "session": session })))
}
