pub mod fee_schedule;
pub mod handler;
pub mod nexus;
pub mod tier_config;

pub use fee_schedule::*;
pub use handler::*;
pub use nexus::*;
pub use tier_config::*;
