pub mod enhance;
pub mod error;
pub mod health;
pub mod metrics;
pub mod upscale;
