pub mod account;
pub(crate) mod chain;
pub mod execute;
pub mod fee_admin;
pub mod nexus;
pub mod query;
pub mod tier_admin;

pub use account::*;
pub use execute::*;
pub use fee_admin::*;
pub use nexus::*;
pub use query::*;
pub use tier_admin::*;
