use utoipa::OpenApi;
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::Modify;

/// 为 Swagger UI 提供业务接口前缀的 Servers 配置。
///
/// - 业务接口默认前缀为 `/api`（对应 `config.api.prefix` / `APP_API__PREFIX`）。
/// - `/health` 不带前缀，因此额外提供 `/` 作为备用 server。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认 /api）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api")
                    .description(Some("业务接口前缀：对应 config.api.prefix")),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（用于 /health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::contact::handler::submit_contact,
        crate::features::settings::handler::get_settings,
    ),
    components(schemas(
        crate::error::ProblemDetails,
        crate::features::contact::models::ContactRequest,
        crate::features::contact::models::ContactResponse,
        crate::features::settings::handler::SettingsResponse,
        crate::features::health::handler::HealthResponse,
    )),
    modifiers(&ApiServers),
    tags(
        (name = "Contact", description = "联系表单：校验后写入联系表单存储。"),
        (name = "Settings", description = "站点设置：固定的前端初始化参数。"),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Estate Site API",
        version = env!("CARGO_PKG_VERSION"),
        description = "房产营销站点的 JSON 接口（Axum + utoipa）。除 /health 外，接口挂载在 `config.api.prefix`（默认 /api）下。"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_lists_contact_and_settings() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/contact"));
        assert!(doc.paths.paths.contains_key("/settings"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
