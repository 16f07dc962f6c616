//! Provider abstraction, dispatch and simulated backends.
//!
//! This module contains:
//! - [`Provider`] trait implemented by each upstream backend
//! - [`ProviderRegistry`] mapping provider ids to backends and dispatching
//! - [`SimulatedProvider`] echo backends with fixed latency

pub mod registry;
pub mod simulated;
pub mod traits;

pub use registry::ProviderRegistry;
pub use simulated::SimulatedProvider;
pub use traits::Provider;
