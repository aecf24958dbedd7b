//! This crate provides the scheduling core of a personal weekly planner.
//!
//! Tasks carry a time range and an optional recurrence rule (see [`Task`]). The [`expand`] module turns a task into the concrete occurrences visible in a displayed week, and the [`layout`] module maps each occurrence onto the pixel grid of a week view.
//!
//! Task lists live in two kinds of stores: a remote HTTP resource in the [`client`] module, and a local file-backed store in the [`cache`] module. \
//! A [`Controller`] keeps the in-memory list of a session consistent with either store: mutations apply optimistically, are pushed through a tolerant write protocol, and roll back when the store rejects them.

pub mod traits;

pub mod week;
pub mod time;
mod task;
pub use task::{sort_tasks, Periodicity, Priority, SortOrder, Task, TaskPatch};
mod organization;
pub use organization::Organization;
pub mod expand;
pub use expand::Occurrence;
pub mod layout;
pub mod controller;
pub use controller::{Controller, MutationOutcome};

pub mod client;
pub mod cache;

pub mod config;
pub mod mock_behaviour;
