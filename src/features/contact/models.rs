use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 联系表单请求体。
///
/// 字段全部可选，缺失与空白统一由 [`ContactRequest::validate`] 判定，
/// 以便返回固定的 “Missing required fields” 响应。
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct ContactRequest {
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    #[schema(example = "+1 555 0199")]
    pub phone: Option<String>,
    #[schema(example = "I'd like to book a viewing.")]
    pub message: Option<String>,
}

impl ContactRequest {
    /// 校验必填字段并规范化（去除首尾空白，空电话视为未填写）。
    pub fn validate(self) -> Option<ContactSubmission> {
        let name = non_blank(self.name)?;
        let email = non_blank(self.email)?;
        let message = non_blank(self.message)?;
        Some(ContactSubmission {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            phone: non_blank(self.phone),
            message,
            created_at: Utc::now(),
        })
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// 已校验的联系表单提交记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// 联系表单响应体
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContactResponse {
    #[schema(example = "Form submitted successfully")]
    pub message: String,
    /// 成功时返回的提交 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ContactResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }
}
