//! tests/common/harness.rs
use async_trait::async_trait;
use dialer_bridge::{
    Config, DialerBridge, Result,
    call::{CallDetails, CallHandle, CallId, CallState, Direction},
    config::NotificationConfig,
    dispatcher::{ChannelTransport, EventReceiver},
    error::Error,
    event::EventMessage,
    platform::{KeyAction, PhoneAccount, Platform, SettingsSurface},
};
use std::sync::{
    Arc, Mutex, Once,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "dialer_bridge=debug,call_flow=info".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .init();
    });
}

/// A platform where the telecom service works only for the default dialer
/// and key injection is never permitted, like an unprivileged device.
#[derive(Debug, Default)]
pub struct TestPlatform {
    pub default_dialer: AtomicBool,
    pub grant_role_on_request: AtomicBool,
    /// Makes dispatching the call intent fail at runtime.
    pub intent_fails: AtomicBool,
    pub log: Mutex<Vec<String>>,
}

impl TestPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }
}

#[async_trait]
impl Platform for TestPlatform {
    fn is_default_dialer(&self) -> bool {
        self.default_dialer.load(Ordering::SeqCst)
    }

    fn register_phone_account(&self, account: &PhoneAccount) -> Result<()> {
        self.record(format!("register_phone_account:{}", account.id));
        Ok(())
    }

    fn place_call(&self, number: &str) -> Result<()> {
        self.record(format!("place_call:{}", number));
        if self.is_default_dialer() {
            Ok(())
        } else {
            Err(Error::Unauthorized("CALL_PHONE".to_string()))
        }
    }

    fn start_call_intent(&self, number: &str, prefer_self: bool) -> Result<bool> {
        self.record(format!("start_call_intent:{}:{}", number, prefer_self));
        if self.intent_fails.load(Ordering::SeqCst) {
            return Err(Error::Platform("activity launch failed".to_string()));
        }
        Ok(true)
    }

    fn end_call(&self) -> Result<bool> {
        self.record("end_call");
        if self.is_default_dialer() {
            Ok(true)
        } else {
            Err(Error::Unauthorized("ANSWER_PHONE_CALLS".to_string()))
        }
    }

    fn inject_key_event(&self, key_code: u32, privileged: bool) -> Result<()> {
        self.record(format!("inject_key_event:{}:{}", key_code, privileged));
        Err(Error::Unauthorized("INJECT_EVENTS".to_string()))
    }

    fn dispatch_media_key(&self, key_code: u32, action: KeyAction) -> Result<()> {
        self.record(format!("dispatch_media_key:{}:{:?}", key_code, action));
        Ok(())
    }

    fn is_role_available(&self) -> bool {
        true
    }

    async fn request_dialer_role(&self) -> Result<()> {
        self.record("request_dialer_role");
        // The grant prompt resolves some time after it is shown.
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.grant_role_on_request.load(Ordering::SeqCst) {
            self.default_dialer.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn open_settings(&self, surface: SettingsSurface) -> Result<bool> {
        self.record(format!("open_settings:{:?}", surface));
        Ok(true)
    }

    fn show_incoming_call(&self, number: &str, notification: &NotificationConfig) -> Result<()> {
        self.record(format!(
            "show_incoming_call:{}:{}",
            number, notification.channel_id
        ));
        Ok(())
    }

    fn dismiss_incoming_call(&self, notification_id: u32) -> Result<()> {
        self.record(format!("dismiss_incoming_call:{}", notification_id));
        Ok(())
    }
}

/// A call object that records the actions taken on it.
#[derive(Debug)]
pub struct TestCall {
    pub id: u64,
    pub direction: Direction,
    pub handle: Option<String>,
    pub state: Mutex<CallState>,
    pub actions: Mutex<Vec<&'static str>>,
}

impl TestCall {
    pub fn incoming(id: u64, handle: &str) -> Arc<Self> {
        Self::new(id, Direction::Incoming, handle, CallState::Ringing)
    }

    pub fn outgoing(id: u64, handle: &str) -> Arc<Self> {
        Self::new(id, Direction::Outgoing, handle, CallState::Dialing)
    }

    fn new(id: u64, direction: Direction, handle: &str, state: CallState) -> Arc<Self> {
        Arc::new(Self {
            id,
            direction,
            handle: Some(handle.to_string()),
            state: Mutex::new(state),
            actions: Mutex::new(Vec::new()),
        })
    }

    pub fn set_state(&self, state: CallState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn actions(&self) -> Vec<&'static str> {
        self.actions.lock().unwrap().clone()
    }
}

impl CallHandle for TestCall {
    fn id(&self) -> CallId {
        CallId(self.id)
    }

    fn details(&self) -> CallDetails {
        CallDetails {
            direction: self.direction,
            handle: self.handle.clone(),
        }
    }

    fn state(&self) -> CallState {
        *self.state.lock().unwrap()
    }

    fn answer(&self) -> Result<()> {
        self.actions.lock().unwrap().push("answer");
        Ok(())
    }

    fn reject(&self) -> Result<()> {
        self.actions.lock().unwrap().push("reject");
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.actions.lock().unwrap().push("disconnect");
        Ok(())
    }
}

/// A bridge over a [`TestPlatform`] with a channel transport attached.
pub struct TestHarness {
    pub bridge: DialerBridge,
    pub platform: Arc<TestPlatform>,
    pub events: EventReceiver,
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        let platform = TestPlatform::new();
        let bridge = DialerBridge::new(Config::default(), platform.clone()).unwrap();
        let (transport, events) = ChannelTransport::new("app.call_manager/call");
        bridge.dispatcher().attach(Arc::new(transport));
        Self {
            bridge,
            platform,
            events,
        }
    }

    /// Waits for pending deliveries and returns everything received so far,
    /// rendered as `method{number}`.
    pub async fn drain_events(&mut self) -> Vec<String> {
        self.bridge.dispatcher().flush().await.unwrap();
        let mut rendered = Vec::new();
        while let Some(message) = self.events.try_recv() {
            rendered.push(render(&message));
        }
        rendered
    }
}

pub fn render(message: &EventMessage) -> String {
    format!("{}{{{}}}", message.method, message.number().unwrap_or_default())
}

pub fn as_handle(call: &Arc<TestCall>) -> Arc<dyn CallHandle> {
    call.clone()
}
