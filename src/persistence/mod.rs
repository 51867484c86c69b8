// Persistence module for the PostgreSQL order store
pub mod orders;

pub use orders::PgOrderStore;
