pub(crate) use registration::ConnectionGuard;
pub(crate) use task_pool::{WorkerPool, WorkerState};

mod registration;
mod task_pool;
