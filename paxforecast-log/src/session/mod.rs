//! The command-driven session around a loaded forecast log.
//!
//! A [`Dispatcher`] owns at most one loaded file ([`Session`]) and runs
//! [`Command`]s against it one at a time. Everything a command produces is
//! pushed to a [`NotificationSink`] as it happens.

mod dispatch;
mod notify;

pub use dispatch::{Command, DispatchError, Dispatcher, Session};
pub use notify::{ChannelSink, FnSink, Notification, NotificationSink};

#[cfg(test)]
mod tests;
