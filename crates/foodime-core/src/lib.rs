pub mod health;
pub mod identity;
pub mod middleware;
pub mod pagination;
pub mod serde;
pub mod tracing;
