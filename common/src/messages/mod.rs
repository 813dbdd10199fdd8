pub mod favorite_messages;
pub mod geo_messages;
pub mod map_messages;
pub mod route_messages;
pub mod search_messages;
pub mod wizard_messages;

pub use favorite_messages::*;
pub use geo_messages::*;
pub use map_messages::*;
pub use route_messages::*;
pub use search_messages::*;
pub use wizard_messages::*;
