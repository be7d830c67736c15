use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::config::SiteSettings;
use crate::state::AppState;

/// 站点设置响应
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[schema(example = "Horizon Estates")]
    pub site_name: String,
    #[schema(example = "hello@horizon-estates.example")]
    pub contact_email: String,
    #[schema(example = "+1 555 0100")]
    pub contact_phone: String,
    pub address: String,
    #[schema(example = "light")]
    pub theme: String,
}

impl From<&SiteSettings> for SettingsResponse {
    fn from(s: &SiteSettings) -> Self {
        Self {
            site_name: s.site_name.clone(),
            contact_email: s.contact_email.clone(),
            contact_phone: s.contact_phone.clone(),
            address: s.address.clone(),
            theme: s.theme.clone(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/settings",
    summary = "站点设置",
    description = "返回固定的站点设置记录（站点名称、联系方式、主题），供前端初始化使用。",
    responses((status = 200, description = "站点设置", body = SettingsResponse)),
    tag = "Settings"
)]
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(SettingsResponse::from(state.settings.as_ref()))
}

pub fn create_settings_router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings))
}
