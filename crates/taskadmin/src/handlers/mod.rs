pub mod artifacts;
pub mod error;
pub mod health;
pub mod task_runs;
pub mod tasks;
pub mod users;

pub use error::AppError;
