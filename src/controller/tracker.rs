//! Tracks the single call the host reports through its in-call callbacks.
//!
//! The tracker is the only writer of the active-call reference. It is driven
//! exclusively by host notifications and never transitions on its own; the
//! controller's commands only read it.
//!
//! 跟踪宿主通过通话回调报告的唯一呼叫。
//!
//! 跟踪器是活动呼叫引用的唯一写入者。它完全由宿主通知驱动，从不自行转换状态；控制器的命令只读取它。

use crate::{
    call::{CallHandle, CallId, CallState, Direction},
    config::NotificationConfig,
    dispatcher::EventDispatcher,
    error::Result,
    event::CallEvent,
    platform::Platform,
};
use parking_lot::Mutex;
use std::{
    fmt,
    sync::{Arc, Weak},
};
use tracing::{debug, info, warn};

/// The controller's view of the tracked call.
///
/// 控制器对被跟踪呼叫的视图。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    None,
    Ringing,
    Dialing,
    Active,
    Disconnected,
}

/// The tracked call. Direction and number are captured once, when the call is
/// added, and stay stable even if the host object's details change later.
///
/// 被跟踪的呼叫。方向和号码在呼叫添加时捕获一次，即使宿主对象的详情之后改变也保持不变。
#[derive(Debug)]
struct ActiveCall {
    id: CallId,
    /// Released once the call disconnects.
    call: Option<Weak<dyn CallHandle>>,
    direction: Direction,
    number: String,
    phase: CallPhase,
    ended_emitted: bool,
}

struct TrackerInner {
    active: Mutex<Option<ActiveCall>>,
    dispatcher: EventDispatcher,
    platform: Arc<dyn Platform>,
    notification: NotificationConfig,
}

/// A handle to the call tracker. Clones share state.
///
/// 呼叫跟踪器的句柄。克隆共享状态。
#[derive(Clone)]
pub struct CallTracker {
    inner: Arc<TrackerInner>,
}

impl fmt::Debug for CallTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallTracker")
            .field("active", &*self.inner.active.lock())
            .finish()
    }
}

impl CallTracker {
    pub fn new(
        dispatcher: EventDispatcher,
        platform: Arc<dyn Platform>,
        notification: NotificationConfig,
    ) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                active: Mutex::new(None),
                dispatcher,
                platform,
                notification,
            }),
        }
    }

    /// Handles a call the host has just added. It replaces any previously
    /// tracked call; a replaced call that never reported its end gets its
    /// `callEnded` now, since its own removal will no longer match.
    ///
    /// Outgoing calls are only recorded. Their `outgoingCall` event comes from
    /// whoever started them: [`place_call`](super::CallController::place_call),
    /// a call intent or the outgoing-call broadcast.
    ///
    /// 处理宿主刚添加的呼叫。它会替换之前跟踪的任何呼叫；被替换且尚未报告结束的呼叫此时补发
    /// `callEnded`，因为它自己的移除回调将不再匹配。
    ///
    /// 去电只被记录。其 `outgoingCall` 事件由发起方发出。
    pub fn on_call_added(&self, call: &Arc<dyn CallHandle>) {
        let details = call.details();
        let number = details.number();
        let id = call.id();
        info!(
            call = %id,
            direction = ?details.direction,
            state = ?call.state(),
            "Call added"
        );

        let phase = match details.direction {
            Direction::Outgoing => CallPhase::Dialing,
            Direction::Incoming => CallPhase::Ringing,
        };
        let replaced_ended = {
            let mut active = self.inner.active.lock();
            let replaced_ended = active.as_mut().and_then(|previous| {
                let event = Self::take_call_ended(previous);
                if event.is_some() {
                    warn!(previous = %previous.id, call = %id, "Replacing a call that never ended");
                } else {
                    debug!(previous = %previous.id, "Replacing previously tracked call");
                }
                event
            });
            *active = Some(ActiveCall {
                id,
                call: Some(Arc::downgrade(call)),
                direction: details.direction,
                number: number.clone(),
                phase,
                ended_emitted: false,
            });
            replaced_ended
        };

        if let Some(event) = replaced_ended {
            self.inner.dispatcher.emit(event);
        }

        match details.direction {
            Direction::Outgoing => debug!(call = %id, number = %number, "Tracking outgoing call"),
            Direction::Incoming => {
                self.inner.dispatcher.emit(CallEvent::IncomingCall {
                    number: number.clone(),
                });
                if let Err(e) = self
                    .inner
                    .platform
                    .show_incoming_call(&number, &self.inner.notification)
                {
                    warn!(call = %id, "Failed to surface incoming call: {}", e);
                }
            }
        }
    }

    /// Handles a state change reported for `call`. Changes for any call other
    /// than the tracked one are ignored.
    ///
    /// 处理为 `call` 报告的状态变化。非被跟踪呼叫的变化将被忽略。
    pub fn on_state_changed(&self, call: &Arc<dyn CallHandle>, state: CallState) {
        let id = call.id();
        debug!(call = %id, ?state, "Call state changed");

        let event = {
            let mut guard = self.inner.active.lock();
            let Some(active) = guard.as_mut().filter(|active| active.id == id) else {
                debug!(call = %id, "State change for an untracked call");
                return;
            };
            if active.phase == CallPhase::Disconnected {
                return;
            }

            match state {
                CallState::Active => {
                    active.phase = CallPhase::Active;
                    let number = active.number.clone();
                    info!(call = %id, "Call became active");
                    Some(match active.direction {
                        Direction::Outgoing => CallEvent::OutgoingCallConnected { number },
                        Direction::Incoming => CallEvent::IncomingCallConnected { number },
                    })
                }
                CallState::Disconnected => {
                    active.phase = CallPhase::Disconnected;
                    active.call = None;
                    info!(call = %id, "Call disconnected");
                    Self::take_call_ended(active)
                }
                _ => None,
            }
        };

        // Emitted after the lock is released; the dispatcher takes its own lock.
        if let Some(event) = event {
            self.inner.dispatcher.emit(event);
        }
    }

    /// Handles the host removing `call`. Clears the tracked reference.
    ///
    /// 处理宿主移除 `call`。清除被跟踪的引用。
    pub fn on_call_removed(&self, call: &Arc<dyn CallHandle>) {
        let id = call.id();
        info!(call = %id, "Call removed");

        let (event, was_incoming) = {
            let mut guard = self.inner.active.lock();
            if guard.as_ref().map(|active| active.id) != Some(id) {
                debug!(call = %id, "Removed call was not tracked");
                return;
            }
            let Some(mut active) = guard.take() else {
                return;
            };
            (
                Self::take_call_ended(&mut active),
                active.direction == Direction::Incoming,
            )
        };

        if let Some(event) = event {
            self.inner.dispatcher.emit(event);
        }
        if was_incoming {
            if let Err(e) = self
                .inner
                .platform
                .dismiss_incoming_call(self.inner.notification.notification_id)
            {
                debug!("Failed to dismiss incoming call notification: {}", e);
            }
        }
    }

    /// Ends the tracked call: ringing calls are rejected, others disconnected.
    /// `Ok(false)` when there is no live call to end.
    ///
    /// 结束被跟踪的呼叫：响铃中的呼叫被拒接，其余的被挂断。没有可结束的活动呼叫时返回 `Ok(false)`。
    pub fn end_current_call(&self) -> Result<bool> {
        let Some(call) = self.live_call() else {
            return Ok(false);
        };
        match call.state() {
            CallState::Ringing => {
                debug!(call = %call.id(), "Rejecting incoming call");
                call.reject()?;
            }
            state => {
                debug!(call = %call.id(), ?state, "Disconnecting call");
                call.disconnect()?;
            }
        }
        Ok(true)
    }

    /// Answers the tracked call. `Ok(false)` when there is no live call.
    ///
    /// 接听被跟踪的呼叫。没有活动呼叫时返回 `Ok(false)`。
    pub fn answer_current_call(&self) -> Result<bool> {
        let Some(call) = self.live_call() else {
            return Ok(false);
        };
        debug!(call = %call.id(), "Answering call");
        call.answer()?;
        Ok(true)
    }

    pub fn phase(&self) -> CallPhase {
        self.inner
            .active
            .lock()
            .as_ref()
            .map_or(CallPhase::None, |active| active.phase)
    }

    /// The number captured for the tracked call.
    pub fn active_number(&self) -> Option<String> {
        self.inner
            .active
            .lock()
            .as_ref()
            .map(|active| active.number.clone())
    }

    pub fn active_direction(&self) -> Option<Direction> {
        self.inner.active.lock().as_ref().map(|active| active.direction)
    }

    /// Upgrades the tracked reference. The lock is released before the caller
    /// touches the call, since host callbacks may re-enter the tracker.
    fn live_call(&self) -> Option<Arc<dyn CallHandle>> {
        let guard = self.inner.active.lock();
        let active = guard.as_ref()?;
        active.call.as_ref()?.upgrade()
    }

    fn take_call_ended(active: &mut ActiveCall) -> Option<CallEvent> {
        if active.ended_emitted {
            return None;
        }
        active.ended_emitted = true;
        Some(CallEvent::CallEnded)
    }
}
