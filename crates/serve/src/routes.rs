use adapt::{DefinitionView, Outcome, PartsView};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;

use crate::error::ServeError;
use crate::state::AppState;
use crate::templates::IntrospectionTemplate;

/// `spec.md` §6 route table, plus the out-of-core stubs the table still
/// lists (`/`, `/api`, `/api/v1/openapi.json`, `/favicon.ico`).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/.info", get(service_info).head(service_info))
        .route(
            "/.info/{*identifier}",
            get(introspect_identifier)
                .head(introspect_identifier)
                .post(introspect_identifier)
                .put(introspect_identifier)
                .delete(introspect_identifier),
        )
        .route("/favicon.ico", get(favicon))
        .route("/", get(landing))
        .route("/api", get(api_stub))
        .route("/api/v1/openapi.json", get(openapi_stub))
        .route(
            "/{*identifier}",
            get(resolve_identifier)
                .head(resolve_identifier)
                .post(resolve_identifier)
                .put(resolve_identifier)
                .delete(resolve_identifier),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct InfoQuery {
    #[serde(default = "default_true")]
    valid: bool,
}

fn default_true() -> bool {
    true
}

#[tracing::instrument(skip(state))]
async fn service_info(State(state): State<AppState>, Query(query): Query<InfoQuery>) -> Result<Response, ServeError> {
    let info = adapt::service_info(state.store.as_ref(), query.valid).await?;
    Ok(Json(info).into_response())
}

#[tracing::instrument(skip(state, headers))]
async fn introspect_identifier(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServeError> {
    let tail = uri.path().strip_prefix("/.info/").unwrap_or_default();
    let raw_url = uri.to_string();
    let outcome = adapt::handle_introspect(
        method.as_str(),
        &raw_url,
        tail,
        state.store.as_ref(),
        state.service_pattern.as_deref(),
    )
    .await?;
    render_outcome(outcome, &headers)
}

#[tracing::instrument(skip(state, headers))]
async fn resolve_identifier(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServeError> {
    let tail = uri.path().strip_prefix('/').unwrap_or_default();
    let raw_url = uri.to_string();
    let outcome = adapt::handle(
        method.as_str(),
        &raw_url,
        tail,
        state.store.as_ref(),
        state.settings.auto_introspection,
        state.service_pattern.as_deref(),
    )
    .await?;
    render_outcome(outcome, &headers)
}

async fn favicon() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

async fn landing() -> &'static str {
    "RSLV"
}

async fn api_stub() -> &'static str {
    "see /.info"
}

async fn openapi_stub() -> Response {
    Json(json!({ "openapi": "3.0.0", "info": { "title": "RSLV", "version": "0.1.0" } })).into_response()
}

fn prefers_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

fn parts_map(parts: &PartsView) -> Map<String, Value> {
    match serde_json::to_value(parts) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn render_outcome(outcome: Outcome, headers: &HeaderMap) -> Result<Response, ServeError> {
    match outcome {
        Outcome::Redirect {
            status,
            location,
            parts,
            target,
            canonical,
        } => {
            let mut body = parts_map(&parts);
            body.insert("target".into(), json!(target));
            body.insert("canonical".into(), json!(canonical));
            body.insert("status_code".into(), json!(status));
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::FOUND);
            let mut response = (status, Json(Value::Object(body))).into_response();
            if let Ok(value) = header::HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
            Ok(response)
        }
        Outcome::NotFound { parts, error } => {
            let mut body = parts_map(&parts);
            body.insert("error".into(), json!(error));
            Ok((StatusCode::NOT_FOUND, Json(Value::Object(body))).into_response())
        }
        Outcome::Introspect {
            status,
            parts,
            target,
            canonical,
            properties,
            definition,
        } => {
            let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            if prefers_html(headers) {
                let tmpl = IntrospectionTemplate::new(&parts, &target, &canonical, status, &definition);
                return Ok((status_code, Html(tmpl.render()?)).into_response());
            }
            let mut body = parts_map(&parts);
            body.insert("target".into(), json!(target));
            body.insert("canonical".into(), json!(canonical));
            body.insert("status_code".into(), json!(status));
            body.insert("properties".into(), properties.unwrap_or(Value::Null));
            body.insert("definition".into(), definition_value(&definition));
            Ok((status_code, Json(Value::Object(body))).into_response())
        }
    }
}

fn definition_value(def: &DefinitionView) -> Value {
    serde_json::to_value(def).unwrap_or(Value::Null)
}
