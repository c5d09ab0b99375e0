//! Event listing, signup and creation endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::CookieJar;
use cares_core::notify::notify_with_timeout;
use cares_core::{CaresError, Event, NewEvent, service};
use serde::{Deserialize, Serialize};

use crate::routes::AppError;
use crate::routes::session::session_id;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_upcoming).post(create_event))
        .route("/events/mine", get(list_mine))
        .route("/events/{id}/signup", post(signup))
}

/// Event plus whether the current visitor is enrolled in it
#[derive(Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub enrolled: bool,
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// GET /events - Upcoming events, earliest first
async fn list_upcoming(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<Vec<EventView>>) {
    let (jar, id) = session_id(jar);
    let session = state.session(id).await;

    let events = service::upcoming(&state.store.load_or_empty(), today())
        .into_iter()
        .map(|event| EventView {
            enrolled: session.is_enrolled(event.id),
            event,
        })
        .collect();

    (jar, Json(events))
}

/// GET /events/mine - Events the visitor signed up for
async fn list_mine(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Vec<Event>>), AppError> {
    let (jar, id) = session_id(jar);
    let session = state.session(id).await;

    if !session.is_logged_in() {
        return Err(CaresError::NotLoggedIn.into());
    }

    let events = service::enrolled(&state.store.load_or_empty(), &session.enrolled_event_ids);

    Ok((jar, Json(events)))
}

/// Outcome of a signup
#[derive(Serialize)]
pub struct SignupResponse {
    pub event: Event,
    /// False when the visitor was already enrolled
    pub newly_enrolled: bool,
    /// Whether the confirmation was handed to the mail relay
    pub notified: bool,
    pub message: String,
}

/// POST /events/:id/signup - Enroll the visitor and send a confirmation
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(event_id): Path<u64>,
) -> Result<(CookieJar, Json<SignupResponse>), AppError> {
    let (jar, id) = session_id(jar);

    // Login is checked before the event id
    let session = state.session(id).await;
    let (name, email) = session
        .identity()
        .map(|(name, email)| (name.to_string(), email.to_string()))
        .ok_or(CaresError::NotLoggedIn)?;

    let events = state.store.load_or_empty();
    let event = service::find(&events, event_id)
        .cloned()
        .ok_or(CaresError::EventNotFound(event_id))?;

    let newly_enrolled = state
        .update_session(id, |session| session.enroll(event_id))
        .await
        .ok_or(CaresError::NotLoggedIn)?;

    if !newly_enrolled {
        return Ok((
            jar,
            Json(SignupResponse {
                message: format!("You are already enrolled in {}", event.title),
                event,
                newly_enrolled,
                notified: false,
            }),
        ));
    }

    tracing::info!(session = %id, event_id, "visitor enrolled");

    let notified = match notify_with_timeout(
        state.notifier.as_ref(),
        state.notify_timeout,
        &name,
        &email,
        &event,
    )
    .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, event_id, "signup confirmation failed");
            false
        }
    };

    let message = if notified {
        format!("Enrolled in {}! A confirmation is on its way to {email}", event.title)
    } else {
        format!(
            "Enrolled in {}, but we could not send a confirmation email",
            event.title
        )
    };

    Ok((
        jar,
        Json(SignupResponse {
            event,
            newly_enrolled,
            notified,
            message,
        }),
    ))
}

/// Request body for adding an event
#[derive(Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub fields: NewEvent,
}

/// POST /events - Add an event (password gated)
async fn create_event(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateEventRequest>, AppError>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    state.admin.check(&req.password)?;

    // The store lock may block while another writer holds it
    let store = state.store.clone();
    let event =
        tokio::task::spawn_blocking(move || store.update(|events| service::add(events, req.fields)))
            .await??;

    tracing::info!(event_id = event.id, title = %event.title, "event added");
    Ok((StatusCode::CREATED, Json(event)))
}
