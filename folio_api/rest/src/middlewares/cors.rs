use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

pub fn add<S: Clone + Send + Sync + 'static>(
    allowed_origins: Vec<HeaderValue>,
) -> impl FnOnce(Router<S>) -> Router<S> {
    |router| {
        router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::POST, Method::PATCH])
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        )
    }
}
