use axum::extract::Request;
use axum::middleware::Next;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, security_headers};
use crate::handlers::{self, events, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState, hsts_enabled: bool) -> Router {
    let event_routes = Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route("/managed", get(events::managed_events))
        .route(
            "/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        );

    let ticket_routes = Router::new()
        .route("/purchase", post(tickets::purchase))
        .route("/my-tickets", get(tickets::my_tickets))
        .route("/code/:code", get(tickets::code_image))
        .route("/scan", post(tickets::scan))
        .route("/all", get(tickets::all_tickets))
        .route("/stats", get(tickets::stats));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/events", event_routes)
        .nest("/api/tickets", ticket_routes)
        .layer(axum::middleware::from_fn(
            move |request: Request, next: Next| security_headers(hsts_enabled, request, next),
        ))
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
