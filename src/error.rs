use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 资源不存在
    #[error("未找到: {0}")]
    NotFound(String),

    /// 页面模板加载/渲染错误
    #[error("模板错误: {0}")]
    Template(String),

    /// 站点内容（YAML）加载错误
    #[error("内容加载错误: {0}")]
    Content(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 联系表单存储后端错误
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum StoreError {
    /// 网络请求错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 上游超时
    #[error("超时")]
    Timeout,

    /// 文档数据库返回非成功状态码
    #[error("上游返回状态 {status}: {body}")]
    Status { status: u16, body: String },

    /// 本地数据库错误
    #[error("数据库错误: {0}")]
    Database(String),

    /// 响应/记录解码失败
    #[error("解码失败: {0}")]
    Decode(String),
}

/// 投机预取失败（只在内部记录，永不向调用方传播）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimeError {
    #[error("网络错误: {0}")]
    Network(String),

    #[error("超时")]
    Timeout,

    #[error("资源返回状态 {0}")]
    Status(u16),

    /// 调用时不在异步运行时内，无法派发加载任务
    #[error("没有可用的异步运行时")]
    NoRuntime,
}

/// RFC7807 风格的错误响应（Problem Details）。
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Not Found")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 404)]
    pub status: u16,

    /// 人类可读的详细信息。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "NOT_FOUND")]
    pub code: String,

    /// 请求追踪 ID（由 request-id 中间件注入）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Template(_) | AppError::Content(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Template(_) => "TEMPLATE_ERROR",
            AppError::Content(_) => "CONTENT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("请求处理失败: {}", self);
        }

        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: Some(self.to_string()),
            code: self.stable_code().to_string(),
            request_id: crate::request_id::current_request_id(),
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Network(err.to_string())
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for PrimeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PrimeError::Timeout
        } else {
            PrimeError::Network(err.to_string())
        }
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn template_engine_errors_become_template_errors() {
        let env = minijinja::Environment::new();
        let err = AppError::from(env.get_template("missing.html").unwrap_err());
        assert!(matches!(err, AppError::Template(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.stable_code(), "TEMPLATE_ERROR");
    }

    #[test]
    fn problem_response_uses_problem_json_content_type() {
        let res = AppError::NotFound("project".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            res.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/problem+json")
        );
    }
}
