//! Gateway implementation

mod builder;
mod engine;

pub use builder::GatewayBuilder;
pub use engine::Gateway;
