pub mod clock;
pub mod driver;
pub mod event;
pub mod observer;
pub mod state;
pub mod worker;

pub use clock::{ExecClock, VirtualClock, WallClock};
pub use driver::Dispatcher;
pub use event::SchedEvent;
pub use state::{CoreId, CoreState, SchedState, Shared, Slice, Task, TaskId, TaskState, Ticks};
pub use worker::Worker;
