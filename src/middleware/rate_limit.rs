use axum::body::Body;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Type alias for the IP-based governor layer used on public routes
pub type PublicGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Create a GovernorLayer for public routes (per IP address)
/// - 100 requests per minute, applied before authentication
pub fn create_public_governor() -> PublicGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(600) // One token every 600ms (100 per minute)
            .burst_size(100)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(config)
}
