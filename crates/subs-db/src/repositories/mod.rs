//! Repository implementations
//!
//! Concrete implementations of the subscription repository trait defined in
//! subs-core.

pub mod memory_repo;
pub mod subscription_repo;

pub use memory_repo::MemorySubscriptionRepository;
pub use subscription_repo::PgSubscriptionRepository;
