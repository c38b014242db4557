pub mod users;

pub use users::{PgUserRepository, UserRepository};
