//! Review backend handlers.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Extension, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::{future, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Instant;

use crate::config::ModelConfig;
use crate::http::request::RequestId;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::review::UpstreamError;
use crate::storage::{ReportSubmission, StorageError};

pub const UPSTREAM_FAILED: &str = "AI模型API调用失败";
pub const BAD_REPLY: &str = "响应格式错误";
pub const STREAM_FAILED: &str = "流式生成过程中出错";
pub const NOT_JSON: &str = "请求体必须为JSON格式";
pub const STORAGE_FAILED: &str = "数据库操作失败";
pub const MISSING_OBJECT_NAME: &str = "缺少 'object_name' 参数";
pub const MISSING_DETAIL_KEYS: &str = "缺少 'object_name' 或 'timestamp' 参数";
pub const REPORT_NOT_FOUND: &str = "未找到指定的举报记录";

/// Body of `/query` and `/query_stream`.
#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub msg: String,
}

/// Query string of the report lookup routes.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub object_name: Option<String>,
    pub timestamp: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn unsupported_model(name: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, format!("不支持的模型: {}", name))
}

fn find_model<'a>(state: &'a AppState, name: &str) -> Option<&'a ModelConfig> {
    state.models.iter().find(|m| m.name == name)
}

/// `GET /fetchModels`
pub async fn fetch_models(State(state): State<AppState>) -> Json<Vec<String>> {
    let names: Vec<String> = state.models.iter().map(|m| m.name.clone()).collect();
    tracing::debug!(models = ?names, "Returning model list");
    Json(names)
}

/// `POST /query`: one completion, reply parsed as JSON.
pub async fn query(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<QueryBody>,
) -> Response {
    let start = Instant::now();
    let Some(model) = find_model(&state, &body.model) else {
        tracing::warn!(request_id = %request_id, model = %body.model, "Unsupported model");
        metrics::record_query("query", 400, start);
        return unsupported_model(&body.model);
    };

    let response = match state.llm.complete(model, &body.prompt, &body.msg).await {
        Ok(content) => match serde_json::from_str::<Value>(&content) {
            Ok(value) => Json(value).into_response(),
            Err(e) => {
                tracing::error!(request_id = %request_id, model = %model.name, error = %e, "Model reply is not JSON");
                error_response(StatusCode::BAD_GATEWAY, BAD_REPLY)
            }
        },
        Err(e) => {
            tracing::error!(request_id = %request_id, model = %model.name, error = %e, "Upstream query failed");
            error_response(StatusCode::BAD_GATEWAY, UPSTREAM_FAILED)
        }
    };

    metrics::record_query("query", response.status().as_u16(), start);
    response
}

/// `POST /query_stream`: relays completion deltas as NDJSON.
pub async fn query_stream(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<QueryBody>,
) -> Response {
    let start = Instant::now();
    let Some(model) = find_model(&state, &body.model) else {
        tracing::warn!(request_id = %request_id, model = %body.model, "Unsupported model");
        metrics::record_query("query_stream", 400, start);
        return unsupported_model(&body.model);
    };

    let deltas = match state.llm.stream(model, &body.prompt, &body.msg).await {
        Ok(deltas) => deltas,
        Err(e) => {
            tracing::error!(request_id = %request_id, model = %model.name, error = %e, "Upstream stream failed");
            metrics::record_query("query_stream", 502, start);
            return error_response(StatusCode::BAD_GATEWAY, UPSTREAM_FAILED);
        }
    };

    // Stop after the first error line
    let mut failed = false;
    let lines = deltas
        .take_while(move |item| {
            let keep = !failed;
            failed |= item.is_err();
            future::ready(keep)
        })
        .map(move |item: Result<String, UpstreamError>| {
            let line = item.unwrap_or_else(|e| {
                tracing::error!(request_id = %request_id, error = %e, "Stream interrupted");
                format!("{}\n", json!({ "error": STREAM_FAILED }))
            });
            Ok::<_, Infallible>(line)
        });

    metrics::record_query("query_stream", 200, start);
    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(lines))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn storage_failure(request_id: &RequestId, error: StorageError) -> Response {
    tracing::error!(request_id = %request_id, error = %error, "Report storage failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, STORAGE_FAILED)
}

/// `POST /api/submit-final-report`: upsert keyed by `object_name`.
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<ReportSubmission>, JsonRejection>,
) -> Response {
    let submission = match body {
        Ok(Json(submission)) => submission,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Report body rejected");
            metrics::record_report_saved("rejected");
            return error_response(StatusCode::BAD_REQUEST, NOT_JSON);
        }
    };

    match state.store.save(submission).await {
        Ok(record) => {
            tracing::info!(
                request_id = %request_id,
                object_name = %record.object_name,
                timestamp = %record.submission_timestamp,
                "Report submitted"
            );
            metrics::record_report_saved("saved");
            Json(json!({
                "status": "success",
                "message": format!("数据已成功保存或更新，主键为: {}", record.object_name),
            }))
            .into_response()
        }
        Err(e @ StorageError::MissingObjectName) => {
            metrics::record_report_saved("rejected");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            metrics::record_report_saved("failed");
            storage_failure(&request_id, e)
        }
    }
}

/// `GET /api/reports`: latest submission per object, newest first.
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Response {
    match state.store.all().await {
        Ok(reports) => Json(reports).into_response(),
        Err(e) => storage_failure(&request_id, e),
    }
}

/// `GET /api/get-timestamps?object_name=`
pub async fn report_timestamps(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let Some(object_name) = non_empty(&query.object_name) else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_OBJECT_NAME);
    };

    match state.store.timestamps(object_name).await {
        Ok(timestamps) => Json(json!({ "timestamps": timestamps })).into_response(),
        Err(e) => storage_failure(&request_id, e),
    }
}

/// `GET /api/get-report-details?object_name=&timestamp=`
pub async fn report_details(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let (Some(object_name), Some(timestamp)) =
        (non_empty(&query.object_name), non_empty(&query.timestamp))
    else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_DETAIL_KEYS);
    };

    match state.store.find(object_name, timestamp).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, REPORT_NOT_FOUND),
        Err(e) => storage_failure(&request_id, e),
    }
}
