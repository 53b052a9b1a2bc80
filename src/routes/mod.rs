use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{admin, auth, bookings, preferences, rides};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::rate_limit::create_public_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // IP-based governor for unauthenticated routes
    let public_governor = create_public_governor();

    // Public routes (rate limited per IP)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    // Public ride browsing
    let public_routes = Router::new()
        .route("/rides", get(rides::list_rides))
        .route("/rides/{id}", get(rides::get_ride))
        .layer(public_governor);

    // Authenticated routes
    let user_routes = Router::new()
        // Ride lifecycle (driver-gated in the service layer)
        .route("/rides", post(rides::create_ride))
        .route("/rides/{id}", put(rides::update_ride))
        .route("/rides/{id}/cancel", patch(rides::cancel_ride))
        .route("/rides/{id}/complete", patch(rides::complete_ride))
        // Bookings
        .route("/rides/{id}/book", post(bookings::book_ride))
        .route("/bookings", get(bookings::my_bookings))
        .route("/bookings/{id}/confirm", patch(bookings::confirm_booking))
        .route("/bookings/{id}/cancel", patch(bookings::cancel_booking))
        .route("/bookings/{id}/review", post(bookings::create_review))
        // Notification preferences
        .route("/notification-preferences", get(preferences::list_preferences))
        .route("/notification-preferences", post(preferences::replace_preferences))
        .route(
            "/notification-preferences/{id}",
            delete(preferences::delete_preference),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        .route("/rides/{id}", delete(admin::delete_ride))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes.merge(user_routes))
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
