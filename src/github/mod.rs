pub mod client;
pub mod issues;
pub mod repo;
pub mod stale;
