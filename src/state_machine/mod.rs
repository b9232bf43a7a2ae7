// State machine module for the task record lifecycle
//
// Pending -> Processing -> Completed, with Pending/Processing -> Failed as the
// only exits on error. Transitions are pure; persistence is the caller's job.

pub mod events;
pub mod states;
pub mod task_state_machine;

pub use events::TaskEvent;
pub use states::TaskStatus;
pub use task_state_machine::TaskStateMachine;
