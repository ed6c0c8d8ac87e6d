//! Single-stack deployment: change sets and stack status polling.

pub mod change_set;
pub mod poller;

pub use change_set::{
    change_set_name, execute_change_set, make_change_set, stack_exists, wait_for_change_set,
    wait_for_change_set_status,
};
pub use poller::{
    is_terminal_status, stack_complete, wait_for_stack, wait_for_stack_with, SeenEvents,
    StackCompletion, TERMINAL_STACK_STATUSES,
};
