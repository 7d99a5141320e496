//! # REST routes under `/api`
//!
//! | Method | Path | Body / response |
//! |--------|------|-----------------|
//! | GET | `/api/auth/me` | `{success, user}` or 401 |
//! | POST | `/api/auth/register` | `{username, password}` → 201 `{success, user}` |
//! | POST | `/api/auth/login` | `{username, password}` → `{success, user}` or 401 |
//! | POST | `/api/auth/logout` | `{success, message}` |
//! | POST | `/api/auth/update-location` | `{userId, location}` → `{success, message}` |
//! | GET | `/api/auth/last-parking-location/{userId}` | `{success, data}` or 404 |
//! | GET | `/api/geocode/reverse?lat=&lng=` | `{success, address}` |
//!
//! The router expects a `tower_sessions::SessionManagerLayer` to be layered on top
//! by the caller; every handler reads the signed-in user from the session.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use map::LatLng;
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::{session_user_id, SESSION_USER_ID_KEY};
use crate::error::AppError;
use crate::geocode::Geocoder;
use crate::models::{
    AddressResponse, AuthResponse, Credentials, LastLocationResponse, LocationUpdate,
    StatusResponse, User,
};
use crate::service;
use crate::store::UserStore;

#[derive(Clone)]
pub struct ApiState<S> {
    store: S,
    geocoder: Geocoder,
}

/// Build the `/api` router over a user store.
pub fn router<S: UserStore>(store: S, geocoder: Geocoder) -> Router {
    Router::new()
        .route("/api/auth/me", get(me::<S>))
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/update-location", post(update_location::<S>))
        .route(
            "/api/auth/last-parking-location/{user_id}",
            get(last_parking_location::<S>),
        )
        .route("/api/geocode/reverse", get(reverse_geocode::<S>))
        .with_state(ApiState { store, geocoder })
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Bind the session to `user` under a fresh session id.
async fn sign_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.cycle_id().await?;
    session
        .insert(SESSION_USER_ID_KEY, user.id.to_string())
        .await?;
    Ok(())
}

async fn me<S: UserStore>(
    State(state): State<ApiState<S>>,
    session: Session,
) -> Result<Json<AuthResponse>, AppError> {
    let session_user = session_user_id(&session).await?;
    let user = service::current_user(&state.store, session_user).await?;
    Ok(Json(AuthResponse::new(user.to_info())))
}

async fn register<S: UserStore>(
    State(state): State<ApiState<S>>,
    session: Session,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let credentials = body(payload)?;
    let user = service::register(&state.store, &credentials.username, &credentials.password).await?;

    sign_in(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user.to_info()))))
}

async fn login<S: UserStore>(
    State(state): State<ApiState<S>>,
    session: Session,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let credentials = body(payload)?;
    let user = service::login(&state.store, &credentials.username, &credentials.password).await?;

    sign_in(&session, &user).await?;

    tracing::info!("User {} logged in", user.username);
    Ok(Json(AuthResponse::new(user.to_info())))
}

async fn logout(session: Session) -> Result<Json<StatusResponse>, AppError> {
    session.flush().await?;
    Ok(Json(StatusResponse::ok("Logged out")))
}

async fn update_location<S: UserStore>(
    State(state): State<ApiState<S>>,
    session: Session,
    payload: Result<Json<LocationUpdate>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let update = body(payload)?;
    let session_user = session_user_id(&session).await?;
    service::update_location(&state.store, session_user, &update.user_id, update.location).await?;
    Ok(Json(StatusResponse::ok("Parking location saved")))
}

async fn last_parking_location<S: UserStore>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(user_id): Path<String>,
) -> Result<Json<LastLocationResponse>, AppError> {
    let session_user = session_user_id(&session).await?;
    let spot = service::last_location(&state.store, session_user, &user_id).await?;
    Ok(Json(LastLocationResponse {
        success: true,
        data: Some(spot),
    }))
}

#[derive(Debug, Deserialize)]
struct GeocodeQuery {
    lat: f64,
    lng: f64,
}

async fn reverse_geocode<S: UserStore>(
    State(state): State<ApiState<S>>,
    session: Session,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> Result<Json<AddressResponse>, AppError> {
    if session_user_id(&session).await?.is_none() {
        return Err(AppError::Unauthorized("Not authenticated".into()));
    }

    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let at = LatLng::new(query.lat, query.lng);
    if !at.is_valid() {
        return Err(AppError::BadRequest("Invalid coordinates".into()));
    }

    let address = state.geocoder.reverse(at).await.map_err(|e| {
        tracing::warn!("Reverse geocoding failed: {}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(AddressResponse {
        success: true,
        address,
    }))
}
