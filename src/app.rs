use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth, state::AppState};

pub fn build_app(state: AppState) -> Router {
    let storefront = cors_for(&state.config.frontend_url, Method::POST);
    let product_service = cors_for(&state.config.product_service_url, Method::GET);

    Router::new()
        .merge(auth::handlers::user_routes().layer(storefront))
        .merge(auth::handlers::lookup_routes().layer(product_service))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// Echoes a single configured origin on every response of the route group.
fn cors_for(origin: &str, method: Method) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin.trim_end_matches('/')) {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            tracing::warn!(error = %e, origin, "origin is not a valid header value; CORS disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([method, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
