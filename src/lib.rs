#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The platform bridge of a dialer application.
//! 拨号器应用的平台桥接层。
//!
//! OS call callbacks become an ordered stream of call events for the
//! application shell, and the shell's commands become ordered fallback chains
//! of OS actions.
//!
//! 操作系统的呼叫回调被转换为面向应用外壳的有序呼叫事件流，
//! 而应用外壳的命令被转换为操作系统动作的有序后备链。

pub mod bridge;
pub mod call;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod host;
pub mod platform;

#[cfg(test)]
mod testing;

pub use bridge::DialerBridge;
pub use config::Config;
pub use controller::CallController;
pub use dispatcher::EventDispatcher;
pub use error::{Error, Result};
pub use event::{CallEvent, EventMessage};
