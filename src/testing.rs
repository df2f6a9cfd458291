//! 测试辅助工具模块
//! Test utilities module

#![cfg(test)]

use crate::{
    call::{CallDetails, CallHandle, CallId, CallState, Direction},
    config::NotificationConfig,
    dispatcher::EventTransport,
    error::{Error, Result},
    event::EventMessage,
    platform::{KeyAction, PhoneAccount, Platform, SettingsSurface},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::Notify;

/// How a fake API call behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Succeed,
    /// `Ok(false)` for APIs that can report "nothing happened".
    Decline,
    Unauthorized,
    Unsupported,
    /// A runtime failure reported by the platform.
    PlatformError,
    Panic,
}

impl Behavior {
    fn unit(self, api: &'static str) -> Result<()> {
        match self {
            Behavior::Succeed | Behavior::Decline => Ok(()),
            Behavior::Unauthorized => Err(Error::Unauthorized(api.to_string())),
            Behavior::Unsupported => Err(Error::Unsupported(api)),
            Behavior::PlatformError => Err(Error::Platform(format!("{} failed", api))),
            Behavior::Panic => panic!("{} faulted", api),
        }
    }

    fn flag(self, api: &'static str) -> Result<bool> {
        match self {
            Behavior::Decline => Ok(false),
            other => other.unit(api).map(|_| true),
        }
    }
}

/// A transport that records every delivered message.
#[derive(Debug)]
pub(crate) struct RecordingTransport {
    name: String,
    messages: Mutex<Vec<EventMessage>>,
    failing_methods: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub(crate) fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            messages: Mutex::new(Vec::new()),
            failing_methods: Mutex::new(HashSet::new()),
        })
    }

    /// Makes deliveries of `method` fail.
    pub(crate) fn fail_on(&self, method: &str) {
        self.failing_methods.lock().insert(method.to_string());
    }

    pub(crate) fn messages(&self) -> Vec<EventMessage> {
        self.messages.lock().clone()
    }

    /// Delivered messages rendered as `method{number}`.
    pub(crate) fn events(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .map(|m| format!("{}{{{}}}", m.method, m.number().unwrap_or_default()))
            .collect()
    }
}

#[async_trait]
impl EventTransport for RecordingTransport {
    async fn deliver(&self, message: EventMessage) -> Result<()> {
        if self.failing_methods.lock().contains(&message.method) {
            return Err(Error::ChannelClosed);
        }
        self.messages.lock().push(message);
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}

/// A scriptable platform. Every API defaults to `Unsupported`.
#[derive(Default)]
pub(crate) struct FakePlatform {
    behaviors: Mutex<HashMap<&'static str, Behavior>>,
    log: Mutex<Vec<String>>,
    default_dialer: AtomicBool,
    role_available: AtomicBool,
    grant_role: AtomicBool,
    hold_role_prompt: AtomicBool,
    role_prompt: Notify,
}

impl FakePlatform {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn set(&self, api: &'static str, behavior: Behavior) -> &Self {
        self.behaviors.lock().insert(api, behavior);
        self
    }

    pub(crate) fn set_default_dialer(&self, value: bool) {
        self.default_dialer.store(value, Ordering::SeqCst);
    }

    pub(crate) fn set_role_available(&self, value: bool) {
        self.role_available.store(value, Ordering::SeqCst);
    }

    /// Whether the user grants the role when prompted.
    pub(crate) fn set_grant_role(&self, value: bool) {
        self.grant_role.store(value, Ordering::SeqCst);
    }

    /// Keeps the role prompt open until [`release_role_prompt`](Self::release_role_prompt).
    pub(crate) fn hold_role_prompt(&self) {
        self.hold_role_prompt.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release_role_prompt(&self) {
        self.role_prompt.notify_one();
    }

    /// Every API invoked, in order.
    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn record(&self, api: &'static str, detail: Option<String>) -> Behavior {
        let entry = match detail {
            Some(detail) => format!("{}:{}", api, detail),
            None => api.to_string(),
        };
        self.log.lock().push(entry);
        self.behaviors
            .lock()
            .get(api)
            .copied()
            .unwrap_or(Behavior::Unsupported)
    }
}

#[async_trait]
impl Platform for FakePlatform {
    fn is_default_dialer(&self) -> bool {
        self.default_dialer.load(Ordering::SeqCst)
    }

    fn register_phone_account(&self, account: &PhoneAccount) -> Result<()> {
        self.record("register_phone_account", Some(account.id.clone()))
            .unit("register_phone_account")
    }

    fn place_call(&self, number: &str) -> Result<()> {
        self.record("place_call", Some(number.to_string()))
            .unit("place_call")
    }

    fn start_call_intent(&self, number: &str, prefer_self: bool) -> Result<bool> {
        self.record("start_call_intent", Some(format!("{}:{}", number, prefer_self)))
            .flag("start_call_intent")
    }

    fn end_call(&self) -> Result<bool> {
        self.record("end_call", None).flag("end_call")
    }

    fn accept_ringing_call(&self) -> Result<()> {
        self.record("accept_ringing_call", None)
            .unit("accept_ringing_call")
    }

    fn inject_key_event(&self, key_code: u32, privileged: bool) -> Result<()> {
        let api = if privileged {
            "inject_key_event_privileged"
        } else {
            "inject_key_event"
        };
        self.record(api, Some(key_code.to_string())).unit(api)
    }

    fn dispatch_media_key(&self, key_code: u32, action: KeyAction) -> Result<()> {
        self.record("dispatch_media_key", Some(format!("{}:{:?}", key_code, action)))
            .unit("dispatch_media_key")
    }

    fn is_role_available(&self) -> bool {
        self.role_available.load(Ordering::SeqCst)
    }

    async fn request_dialer_role(&self) -> Result<()> {
        self.record("request_dialer_role", None);
        if self.hold_role_prompt.load(Ordering::SeqCst) {
            self.role_prompt.notified().await;
        }
        if self.grant_role.load(Ordering::SeqCst) {
            self.default_dialer.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn open_settings(&self, surface: SettingsSurface) -> Result<bool> {
        self.record("open_settings", Some(format!("{:?}", surface)))
            .flag("open_settings")
    }

    fn show_incoming_call(&self, number: &str, _notification: &NotificationConfig) -> Result<()> {
        self.record("show_incoming_call", Some(number.to_string()))
            .unit("show_incoming_call")
    }

    fn dismiss_incoming_call(&self, notification_id: u32) -> Result<()> {
        self.record("dismiss_incoming_call", Some(notification_id.to_string()))
            .unit("dismiss_incoming_call")
    }
}

/// A scriptable call object.
#[derive(Debug)]
pub(crate) struct FakeCall {
    id: CallId,
    details: Mutex<CallDetails>,
    state: Mutex<CallState>,
    behaviors: Mutex<HashMap<&'static str, Behavior>>,
    actions: Mutex<Vec<&'static str>>,
}

impl FakeCall {
    pub(crate) fn new(id: u64, direction: Direction, handle: Option<&str>) -> Arc<Self> {
        let state = match direction {
            Direction::Incoming => CallState::Ringing,
            Direction::Outgoing => CallState::Dialing,
        };
        Arc::new(Self {
            id: CallId(id),
            details: Mutex::new(CallDetails {
                direction,
                handle: handle.map(str::to_string),
            }),
            state: Mutex::new(state),
            behaviors: Mutex::new(HashMap::new()),
            actions: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn set(&self, action: &'static str, behavior: Behavior) {
        self.behaviors.lock().insert(action, behavior);
    }

    pub(crate) fn set_state(&self, state: CallState) {
        *self.state.lock() = state;
    }

    pub(crate) fn set_handle(&self, handle: Option<&str>) {
        self.details.lock().handle = handle.map(str::to_string);
    }

    pub(crate) fn actions(&self) -> Vec<&'static str> {
        self.actions.lock().clone()
    }

    fn act(&self, action: &'static str) -> Result<()> {
        self.actions.lock().push(action);
        self.behaviors
            .lock()
            .get(action)
            .copied()
            .unwrap_or(Behavior::Succeed)
            .unit(action)
    }
}

impl CallHandle for FakeCall {
    fn id(&self) -> CallId {
        self.id
    }

    fn details(&self) -> CallDetails {
        self.details.lock().clone()
    }

    fn state(&self) -> CallState {
        *self.state.lock()
    }

    fn answer(&self) -> Result<()> {
        self.act("answer")
    }

    fn reject(&self) -> Result<()> {
        self.act("reject")
    }

    fn disconnect(&self) -> Result<()> {
        self.act("disconnect")
    }
}
