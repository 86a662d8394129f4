pub mod driver;
pub mod job;
pub mod loader;
pub mod workload;

pub use driver::{Schedule, Sim};
pub use job::{Job, TaskSet};
pub use loader::{TaskSource, load_task_set, parse_task_set, resolve_task_set};
pub use workload::{Bernoulli, bernoulli_jobs};
