pub mod analysis;
pub mod enhance;
pub mod prediction;
pub mod strategy;
