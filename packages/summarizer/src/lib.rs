pub mod prompt;
pub mod server;
pub mod worker;

pub use server::build_app;
pub use worker::{run_batch, BatchOutcome, WorkerConfig};
