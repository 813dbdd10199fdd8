pub mod dashboard;
pub mod favorite_store;
pub mod map_sync;
pub mod position_tracker;
pub mod route_overlay;
pub mod search_coordinator;
pub mod wizard;
