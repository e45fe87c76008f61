pub mod enhancer;
pub mod poller;
pub mod replicate;
pub mod vision;
