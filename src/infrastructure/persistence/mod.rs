mod pg_pool;
mod repositories;
mod repository_factory;

pub use pg_pool::{create_pool, run_migrations};
pub use repositories::{InMemoryJobRepository, PgJobRepository};
pub use repository_factory::JobRepositoryFactory;
