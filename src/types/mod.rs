//! Public types for the Switchyard API.

mod provider;
mod request;
mod response;

pub use provider::ProviderId;
pub use request::Request;
pub use response::{Completion, HealthStatus, Response, Usage, approximate_tokens};
