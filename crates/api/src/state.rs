use std::sync::Arc;

use crate::background::aggregation::AggregationQueue;
use crate::config::ServerConfig;
use crate::rotation::location::LocationResolver;
use crate::rule_validator::RuleValidator;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is a channel handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: galley_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Slug to id lookup for menu plan locations.
    pub locations: Arc<LocationResolver>,
    /// Enqueues pairing score recomputes.
    pub aggregation: AggregationQueue,
    /// External rule reviewer; `None` when not configured.
    pub rule_validator: Option<Arc<dyn RuleValidator>>,
}
