//! Google Calendar integration for Daybook.
//!
//! `client` talks to the Calendar v3 REST API; `ops` wraps it in the four
//! tool-facing operations (create, list, update, delete) that format their
//! results for an agent.

pub mod client;
pub mod error;
pub mod ops;
pub mod types;

pub use client::CalendarClient;
pub use error::CalendarError;
pub use ops::{CalendarContext, CreateEventArgs, UpdateEventArgs};
pub use types::{Event, EventPatch, EventTime, NewEvent, Reminders};
