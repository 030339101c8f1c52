//! Database layer: pool and the account store.

mod memory;
mod pool;
mod store;

pub use memory::MemoryAccountStore;
pub use pool::{create_pool, DbPool};
pub use store::{Account, AccountStore, PgAccountStore};
