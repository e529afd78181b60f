//! Query dispatch module
//!
//! Turns filter changes into backend requests and keeps superseded
//! responses from reaching displayed state.

mod dispatcher;
mod slot;

pub use dispatcher::{DispatchState, QueryDispatcher};
pub use slot::{QuerySlot, RequestToken};
