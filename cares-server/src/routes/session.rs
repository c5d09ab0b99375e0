//! Visitor session endpoints
//!
//! Sessions are kept in memory and identified by the `cares_session`
//! cookie. A request without a valid cookie starts a new, empty session.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cares_core::{Page, Session};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routes::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "cares_session";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(show))
        .route("/session/login", post(login))
        .route("/session/page", post(navigate))
}

/// Session id from the cookie, or a new one with the cookie added to the jar.
pub fn session_id(jar: CookieJar) -> (CookieJar, Uuid) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (jar.add(cookie), id)
}

/// Session as returned by the API
#[derive(Serialize)]
pub struct SessionView {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub enrolled_event_ids: Vec<u64>,
    pub current_page: Page,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        let mut enrolled_event_ids: Vec<u64> = session.enrolled_event_ids.iter().copied().collect();
        enrolled_event_ids.sort_unstable();

        SessionView {
            user_name: session.user_name.clone(),
            user_email: session.user_email.clone(),
            enrolled_event_ids,
            current_page: session.current_page,
        }
    }
}

/// GET /session - Current visitor state
async fn show(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<SessionView>) {
    let (jar, id) = session_id(jar);
    let session = state.session(id).await;

    (jar, Json(SessionView::from(&session)))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// POST /session/login - Set the visitor's name and email
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<SessionView>), AppError> {
    let (jar, id) = session_id(jar);

    let session = state.login(id, &req.name, &req.email).await?;
    let view = SessionView::from(&session);

    tracing::info!(session = %id, "visitor logged in");
    Ok((jar, Json(view)))
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub page: Page,
}

/// POST /session/page - Switch between the three views
async fn navigate(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<NavigateRequest>, AppError>,
) -> Result<(CookieJar, Json<SessionView>), AppError> {
    let (jar, id) = session_id(jar);

    // Anonymous visitors are not tracked, so their page is not remembered
    let view = state
        .update_session(id, |session| {
            session.navigate(req.page);
            SessionView::from(&*session)
        })
        .await
        .unwrap_or_else(|| {
            let mut session = Session::new();
            session.navigate(req.page);
            SessionView::from(&session)
        });

    Ok((jar, Json(view)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{
        RecordingNotifier, login, send, test_app, test_app_with_state,
    };

    #[tokio::test]
    async fn test_new_visitor_gets_empty_session_and_cookie() {
        let (_dir, _store, app) = test_app(&[], Arc::default());

        let response = send(&app, "GET", "/session", None, None).await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.cookie.unwrap().starts_with("cares_session="));
        assert_eq!(response.body["user_name"], serde_json::Value::Null);
        assert_eq!(response.body["current_page"], "all_events");
        assert_eq!(response.body["enrolled_event_ids"], json!([]));
    }

    #[tokio::test]
    async fn test_login_persists_across_requests() {
        let (_dir, _store, app) = test_app(&[], Arc::new(RecordingNotifier::default()));

        let cookie = login(&app, "Asha", "asha@example.com").await;
        let response = send(&app, "GET", "/session", Some(&cookie), None).await;

        assert_eq!(response.body["user_name"], "Asha");
        assert_eq!(response.body["user_email"], "asha@example.com");
        assert!(response.cookie.is_none());
    }

    #[tokio::test]
    async fn test_login_requires_email() {
        let (_dir, _store, app) = test_app(&[], Arc::default());

        let response = send(
            &app,
            "POST",
            "/session/login",
            None,
            Some(json!({ "name": "Asha", "email": "" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.body["error"].as_str().unwrap().contains("log in"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (_dir, _store, app) = test_app(&[], Arc::default());

        let asha = login(&app, "Asha", "asha@example.com").await;
        let ravi = login(&app, "Ravi", "ravi@example.com").await;
        assert_ne!(asha, ravi);

        let response = send(&app, "GET", "/session", Some(&asha), None).await;
        assert_eq!(response.body["user_name"], "Asha");
    }

    #[tokio::test]
    async fn test_anonymous_requests_store_no_session() {
        let (_dir, _store, app, state) = test_app_with_state(&[], Arc::default());

        for _ in 0..20 {
            send(
                &app,
                "POST",
                "/session/page",
                None,
                Some(json!({ "page": "my_events" })),
            )
            .await;
            send(&app, "GET", "/session", None, None).await;
            send(&app, "GET", "/events", None, None).await;
        }

        assert_eq!(state.session_count().await, 0);

        login(&app, "Asha", "asha@example.com").await;
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_failed_login_stores_no_session() {
        let (_dir, _store, app, state) = test_app_with_state(&[], Arc::default());

        send(
            &app,
            "POST",
            "/session/login",
            None,
            Some(json!({ "name": "Asha", "email": " " })),
        )
        .await;

        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted_on_login() {
        let (_dir, _store, _app, state) = test_app_with_state(&[], Arc::default());
        let state = state.with_session_ttl(Duration::ZERO);
        let app = crate::routes::app(state.clone());

        login(&app, "Asha", "asha@example.com").await;
        login(&app, "Ravi", "ravi@example.com").await;

        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_json_error() {
        let (_dir, _store, app) = test_app(&[], Arc::default());

        let response = send(
            &app,
            "POST",
            "/session/page",
            None,
            Some(json!({ "page": "settings" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.body["error"].is_string());
    }

    #[tokio::test]
    async fn test_navigate() {
        let (_dir, _store, app) = test_app(&[], Arc::default());
        let cookie = login(&app, "Asha", "asha@example.com").await;

        let response = send(
            &app,
            "POST",
            "/session/page",
            Some(&cookie),
            Some(json!({ "page": "my_events" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["current_page"], "my_events");
    }
}
