use std::panic::AssertUnwindSafe;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use futures_util::FutureExt;

use crate::state::AppState;

use super::models::{ContactRequest, ContactResponse};

pub const MSG_SUCCESS: &str = "Form submitted successfully";
pub const MSG_MISSING_FIELDS: &str = "Missing required fields";
pub const MSG_STORE_FAILED: &str = "Error submitting form";
pub const MSG_INTERNAL: &str = "Internal server error";

#[utoipa::path(
    post,
    path = "/contact",
    summary = "提交联系表单",
    description = "校验 name/email/message 必填后写入联系表单存储（单次写入，不重试）。响应体统一为 `{message}`。",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "提交成功", body = ContactResponse),
        (status = 400, description = "缺少必填字段或请求体无法解析", body = ContactResponse),
        (status = 500, description = "存储写入失败或内部错误", body = ContactResponse)
    ),
    tag = "Contact"
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> (StatusCode, Json<ContactResponse>) {
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!("联系表单请求体无法解析: {}", rejection);
            return reply(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS);
        }
    };

    let Some(submission) = request.validate() else {
        return reply(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS);
    };

    // 写入过程中的 panic 视为“意外异常”，与存储返回的错误区分开
    let outcome = AssertUnwindSafe(state.contact_store.insert(&submission))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {
            tracing::info!(
                id = %submission.id,
                backend = state.contact_store.backend_name(),
                "联系表单已保存"
            );
            (
                StatusCode::OK,
                Json(ContactResponse {
                    message: MSG_SUCCESS.to_string(),
                    id: Some(submission.id),
                }),
            )
        }
        Ok(Err(e)) => {
            tracing::error!(id = %submission.id, "联系表单写入失败: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, MSG_STORE_FAILED)
        }
        Err(_) => {
            tracing::error!(id = %submission.id, "联系表单写入时发生意外异常");
            reply(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}

fn reply(status: StatusCode, message: &str) -> (StatusCode, Json<ContactResponse>) {
    (status, Json(ContactResponse::message(message)))
}

pub fn create_contact_router() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}
