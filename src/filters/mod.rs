//! Filter selection module
//!
//! The cascading selection state machine and the selector view it drives.

mod selector;
mod state;

pub use selector::SelectorView;
pub use state::{reduce, transition, transition_all, Architecture, Effects, FilterAction, FilterState};
