//! Node endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, error};

use crate::application::messages::{Locale, Message};
use crate::application::paging::PageParams;
use crate::application::services::{CreateNode, QueryResult};
use crate::domain::NodeView;
use crate::server::auth::caller_from_headers;
use crate::server::error::{ApiError, NodesEnvelope};
use crate::server::ServerState;

/// Query string of `GET /api/nodes/`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub language: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Query string of `GET /api/nodes/{id}/`.
#[derive(Debug, Default, Deserialize)]
pub struct GetParams {
    pub language: Option<String>,
}

/// Query string of `GET /api/nodes/{id}/children/`.
#[derive(Debug, Default, Deserialize)]
pub struct ChildrenParams {
    pub language: Option<String>,
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Run a query on the blocking pool; the stores do synchronous I/O.
async fn blocking<F>(locale: Locale, f: F) -> Result<Vec<NodeView>, ApiError>
where
    F: FnOnce() -> QueryResult<Vec<NodeView>> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            error!(error = %e, "query task failed");
            Err(ApiError::internal(locale))
        }
    }
}

/// A non-integer id names no node.
fn node_id(path: Result<Path<i64>, PathRejection>, locale: Locale) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        debug!(%rejection, "unparseable node id");
        ApiError::nodes(StatusCode::BAD_REQUEST, Message::NotFound.render(locale))
    })
}

/// GET /api/nodes/?language=English&page_num=0&page_size=5
pub(crate) async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<NodesEnvelope>, ApiError> {
    let locale = Locale::for_request(params.language.as_deref());
    let query = state.query.clone();
    let nodes = blocking(locale, move || {
        query.list_nodes(params.language.as_deref(), &params.page)
    })
    .await?;
    Ok(Json(NodesEnvelope::ok(nodes)))
}

/// GET /api/nodes/{id}/?language=English
pub(crate) async fn get(
    State(state): State<ServerState>,
    path: Result<Path<i64>, PathRejection>,
    Query(params): Query<GetParams>,
) -> Result<Json<NodesEnvelope>, ApiError> {
    let locale = Locale::for_request(params.language.as_deref());
    let id = node_id(path, locale)?;
    let query = state.query.clone();
    let nodes = blocking(locale, move || query.get_node(id, params.language.as_deref())).await?;
    Ok(Json(NodesEnvelope::ok(nodes)))
}

/// GET /api/nodes/{id}/children/?language=English&search=keyword&page_num=0&page_size=5
pub(crate) async fn children(
    State(state): State<ServerState>,
    path: Result<Path<i64>, PathRejection>,
    Query(params): Query<ChildrenParams>,
) -> Result<Json<NodesEnvelope>, ApiError> {
    let locale = Locale::for_request(params.language.as_deref());
    let id = node_id(path, locale)?;
    let query = state.query.clone();
    let nodes = blocking(locale, move || {
        query.search_children(
            id,
            params.language.as_deref(),
            params.search.as_deref(),
            &params.page,
        )
    })
    .await?;
    Ok(Json(NodesEnvelope::ok(nodes)))
}

/// POST /api/nodes/create/
///
/// Requires `Authorization: Token <key>`. Body:
/// `{"parent_id": 5, "names": {"English": "..", "Italian": ".."}, "language": "English"}`
pub(crate) async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Result<Json<CreateNode>, JsonRejection>,
) -> Result<(StatusCode, Json<NodesEnvelope>), ApiError> {
    let Some(caller) = caller_from_headers(&headers, state.credentials.as_ref()) else {
        return Err(ApiError::unauthorized(Locale::default()));
    };
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(%rejection, "unreadable create body");
            return Err(ApiError::nodes(
                StatusCode::BAD_REQUEST,
                Message::MissingParams.render(Locale::default()),
            ));
        }
    };

    let locale = Locale::for_request(request.language.as_deref());
    let query = state.query.clone();
    let nodes = blocking(locale, move || query.create_node(Some(&caller), &request)).await?;
    Ok((
        StatusCode::CREATED,
        Json(NodesEnvelope::ok(nodes).with_message(Message::NodeCreated.render(locale))),
    ))
}
