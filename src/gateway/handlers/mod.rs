pub mod callback;
pub mod health;
#[cfg(feature = "mock-api")]
pub mod mock;
pub mod tools;

pub use callback::provider_callback;
pub use health::health_check;
pub use tools::tool_call;
