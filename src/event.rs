//! Call events and their wire representation.
//!
//! 呼叫事件及其线路表示。

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Reported in place of a number the platform could not resolve.
pub const UNKNOWN_NUMBER: &str = "Unknown";

/// A call-lifecycle event destined for the application shell.
///
/// Events are immutable once built and are consumed exactly once, either by
/// direct delivery or after sitting in the dispatcher's pending queue.
///
/// 发往应用外壳的呼叫生命周期事件。
///
/// 事件一经构造即不可变，并且只会被消费一次：直接投递，或在调度器的待投递队列中等待后投递。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    /// A call is ringing on this device.
    /// 本机有来电响铃。
    IncomingCall { number: String },
    /// An incoming call was answered and is now active.
    /// 来电已接听并处于通话中。
    IncomingCallConnected { number: String },
    /// An outgoing call is being placed.
    /// 正在发起去电。
    OutgoingCall { number: String },
    /// An outgoing call was answered by the remote party.
    /// 去电已被对方接听。
    OutgoingCallConnected { number: String },
    /// The tracked call ended.
    /// 被跟踪的呼叫已结束。
    CallEnded,
}

impl CallEvent {
    pub fn incoming_call(number: Option<&str>) -> Self {
        CallEvent::IncomingCall {
            number: resolve_number(number),
        }
    }

    pub fn incoming_call_connected(number: Option<&str>) -> Self {
        CallEvent::IncomingCallConnected {
            number: resolve_number(number),
        }
    }

    pub fn outgoing_call(number: Option<&str>) -> Self {
        CallEvent::OutgoingCall {
            number: resolve_number(number),
        }
    }

    pub fn outgoing_call_connected(number: Option<&str>) -> Self {
        CallEvent::OutgoingCallConnected {
            number: resolve_number(number),
        }
    }

    /// The method name the shell registers a handler for.
    ///
    /// 应用外壳为之注册处理器的方法名。
    pub fn method(&self) -> &'static str {
        match self {
            CallEvent::IncomingCall { .. } => "incomingCall",
            CallEvent::IncomingCallConnected { .. } => "incomingCallConnected",
            CallEvent::OutgoingCall { .. } => "outgoingCall",
            CallEvent::OutgoingCallConnected { .. } => "outgoingCallConnected",
            CallEvent::CallEnded => "callEnded",
        }
    }

    /// The phone number carried by the event, if the variant carries one.
    pub fn number(&self) -> Option<&str> {
        match self {
            CallEvent::IncomingCall { number }
            | CallEvent::IncomingCallConnected { number }
            | CallEvent::OutgoingCall { number }
            | CallEvent::OutgoingCallConnected { number } => Some(number),
            CallEvent::CallEnded => None,
        }
    }

    /// Converts the event into the message handed to a transport.
    ///
    /// 将事件转换为交给传输层的消息。
    pub fn to_message(&self) -> EventMessage {
        let mut arguments = Map::new();
        if let Some(number) = self.number() {
            arguments.insert("number".to_string(), Value::String(number.to_string()));
        }
        EventMessage {
            method: self.method().to_string(),
            arguments,
        }
    }
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(number) => write!(f, "{}{{{}}}", self.method(), number),
            None => write!(f, "{}{{}}", self.method()),
        }
    }
}

/// A method invocation as it travels over the event channel.
///
/// 在事件通道上传输的方法调用。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMessage {
    /// The method name, e.g. `incomingCall`.
    /// 方法名，例如 `incomingCall`。
    pub method: String,
    /// The method arguments, `{"number": ...}` or empty.
    /// 方法参数，`{"number": ...}` 或为空。
    pub arguments: Map<String, Value>,
}

impl EventMessage {
    /// Reads the `number` argument back, if present.
    pub fn number(&self) -> Option<&str> {
        self.arguments.get("number").and_then(Value::as_str)
    }

    /// Encodes the message as JSON for transports that carry text.
    ///
    /// 将消息编码为JSON，供承载文本的传输使用。
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

impl From<&CallEvent> for EventMessage {
    fn from(event: &CallEvent) -> Self {
        event.to_message()
    }
}

fn resolve_number(number: Option<&str>) -> String {
    number.unwrap_or(UNKNOWN_NUMBER).to_string()
}
