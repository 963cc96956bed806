#![forbid(unsafe_code)]

//! Scenario replay harness for `ftui-sortable`.
//!
//! Mounts a course of parts and lessons as nested sortable lists, replays
//! scripted clicks and drags against a [`ftui_sortable::DragLayer`], and
//! reports the emitted events and the final course order.

pub mod cli;
pub mod error;
pub mod logging;
pub mod nested;
pub mod scenario;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{HarnessError, Result};
pub use nested::{Course, DropTarget, NestedLists, Part};
pub use scenario::{ModifierKey, Report, Scenario, Step, StepOutcome, replay};
