use crate::config::Config;
use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Credentials are allowed, so methods and headers are mirrored rather than wildcarded.
pub fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origin = if config.cors_permissive {
        AllowOrigin::mirror_request()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|s| {
                if s == "*" {
                    anyhow::bail!("ALLOWED_ORIGINS cannot contain \"*\" while credentials are allowed; set CORS_PERMISSIVE instead");
                }
                s.parse::<HeaderValue>()
                    .with_context(|| format!("invalid origin in ALLOWED_ORIGINS: {s:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
