use crate::core::state::AppState;
use crate::routes::{counter, stats};
use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::Method,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use tracing::info_span;

pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        // /counter/...
        .route(
            "/counter",
            get(counter::current_reading).delete(counter::delete_counter),
        )
        .route("/counter/new", post(counter::new_counter))
        .route("/counter/add", post(counter::add_counter))
        .route("/counter/readonlytoken", post(counter::read_only_token))
        .route("/counter/next", post(counter::next))
        .route("/counter/previous", post(counter::previous))
        .route("/counter/reset", post(counter::reset))
        // /stats/...
        .route("/stats/numberofcounters", get(stats::number_of_counters))
        .route("/stats/serverinfo", get(stats::server_info))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(
                    CorsLayer::new()
                        .allow_methods([Method::GET, Method::POST, Method::DELETE])
                        .allow_origin(cors::Any),
                ),
        )
}
