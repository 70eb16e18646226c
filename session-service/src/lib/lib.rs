pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::account;
pub use domain::session;
pub use outbound::cache;
pub use outbound::repositories;
