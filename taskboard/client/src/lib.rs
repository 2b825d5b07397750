//! HTTP client and headless board state for the Taskboard API.
//!
//! [`TaskClient`] speaks the REST API. [`TaskBoard`] drives the list view on
//! top of any [`TaskApi`]: it owns the current page, filters and form state,
//! cancels superseded list requests and applies optimistic status toggles.

pub mod api;
pub mod board;
pub mod debounce;

pub use api::{ClientError, TaskApi, TaskClient, with_cancellation};
pub use board::{BoardState, LoadKind, TaskBoard, TaskFilters};
pub use debounce::Debouncer;
