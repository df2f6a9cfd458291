//! Host callbacks outside the in-call service: connection-service lifecycle,
//! the outgoing-call broadcast, and intents delivered to the application.
//!
//! Each callback is a pure translation of host-reported state into call
//! events; none of them touch the tracked call.
//!
//! 通话服务之外的宿主回调：连接服务生命周期、去电广播以及投递给应用的意图。
//!
//! 每个回调都只是将宿主报告的状态纯粹地转换为呼叫事件；它们都不触碰被跟踪的呼叫。

use crate::{
    call::{Direction, scheme_specific_part},
    dispatcher::EventDispatcher,
    event::CallEvent,
};
use tracing::{debug, info, warn};

/// An intent the host delivered to the application.
///
/// 宿主投递给应用的意图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostIntent {
    /// Place a call to the number (`ACTION_CALL`).
    Call { number: Option<String> },
    /// Open the dialer with the number pre-filled.
    Dial { number: Option<String> },
    /// Show the incoming-call screen.
    ShowIncomingCall { number: Option<String> },
    /// Any other action; ignored.
    Other(String),
}

/// Translates host callbacks into call events.
///
/// 将宿主回调转换为呼叫事件。
#[derive(Debug, Clone)]
pub struct HostCallbacks {
    dispatcher: EventDispatcher,
}

impl HostCallbacks {
    pub fn new(dispatcher: EventDispatcher) -> Self {
        Self { dispatcher }
    }

    /// The connection service created a connection for `address`.
    ///
    /// Outgoing connections are reported as connected straight away, since the
    /// service activates them on creation.
    ///
    /// 连接服务为 `address` 创建了连接。去电连接在创建时即被激活，因此立即报告为已接通。
    pub fn on_connection_created(&self, direction: Direction, address: Option<&str>) {
        let number = address.map(scheme_specific_part);
        info!(?direction, number, "Connection created");
        let event = match direction {
            Direction::Incoming => CallEvent::incoming_call(number),
            Direction::Outgoing => CallEvent::outgoing_call_connected(number),
        };
        self.dispatcher.emit(event);
    }

    /// The connection service failed to create a connection.
    pub fn on_connection_failed(&self, direction: Direction, address: Option<&str>) {
        warn!(?direction, address, "Connection creation failed");
        self.dispatcher.emit(CallEvent::CallEnded);
    }

    /// A connection was disconnected or aborted and destroyed.
    pub fn on_connection_closed(&self) {
        debug!("Connection closed");
        self.dispatcher.emit(CallEvent::CallEnded);
    }

    /// The system broadcast that an outgoing call is being placed.
    ///
    /// 系统广播正在发起去电。
    pub fn on_outgoing_call_broadcast(&self, number: Option<&str>) {
        debug!(number, "Outgoing call detected");
        self.dispatcher.emit(CallEvent::outgoing_call(number));
    }

    /// Handles an intent delivered on launch or while running.
    ///
    /// 处理启动时或运行中投递的意图。
    pub fn handle_intent(&self, intent: &HostIntent) {
        match intent {
            HostIntent::Call { number } => {
                debug!(number = number.as_deref(), "Handling call intent");
                match number.as_deref().map(scheme_specific_part) {
                    Some(number) if !number.is_empty() => {
                        self.dispatcher.emit(CallEvent::outgoing_call(Some(number)));
                    }
                    _ => debug!("Call intent without a number"),
                }
            }
            HostIntent::Dial { number } => {
                // The shell pre-fills the number itself.
                debug!(number = number.as_deref(), "Handling dial intent");
            }
            HostIntent::ShowIncomingCall { number } => {
                debug!(number = number.as_deref(), "Handling show-incoming-call intent");
                self.dispatcher.emit(CallEvent::incoming_call(number.as_deref()));
            }
            HostIntent::Other(action) => {
                debug!(action = %action, "Ignoring intent");
            }
        }
    }
}
