mod stage;
mod task;

pub use stage::*;
pub use task::*;
