//! Todo entity: model, lifecycle status, and priority.

pub mod model;
pub mod priority;
pub mod status;

pub use model::{NewTodo, Todo, TodoChanges, UpdateTodo};
pub use priority::TodoPriority;
pub use status::TodoStatus;
