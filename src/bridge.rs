//! The assembled bridge: one dispatcher, one controller and the host
//! callbacks, built from a [`Config`] and a [`Platform`].
//!
//! 组装好的桥接层：由 [`Config`] 和 [`Platform`] 构建的一个调度器、一个控制器以及宿主回调。

use crate::{
    config::Config,
    controller::{CallController, CallTracker, MethodCall, MethodResponse},
    dispatcher::EventDispatcher,
    error::Result,
    host::HostCallbacks,
    platform::Platform,
};
use std::sync::Arc;
use tracing::{debug, info};

/// The entry point an embedding application holds for its lifetime.
///
/// 嵌入应用在其整个生命周期内持有的入口点。
#[derive(Clone)]
pub struct DialerBridge {
    command_channel: String,
    dispatcher: EventDispatcher,
    controller: Arc<CallController>,
    host: HostCallbacks,
}

impl DialerBridge {
    /// Builds the bridge on the current tokio runtime.
    ///
    /// 在当前tokio运行时上构建桥接层。
    pub fn new(config: Config, platform: Arc<dyn Platform>) -> Result<Self> {
        let dispatcher = EventDispatcher::new(&config.dispatcher)?;
        let command_channel = config.commands.channel_name.clone();
        let host = HostCallbacks::new(dispatcher.clone());
        let controller = Arc::new(CallController::new(config, platform, dispatcher.clone()));

        Ok(Self {
            command_channel,
            dispatcher,
            controller,
            host,
        })
    }

    /// Start-up work: registers the phone account. Returns whether that
    /// succeeded; the bridge is usable either way.
    ///
    /// 启动工作：注册电话账户。返回是否成功；无论如何桥接层都可使用。
    pub fn start(&self) -> bool {
        info!(commands = %self.command_channel, "Starting dialer bridge");
        self.controller.register_phone_account()
    }

    /// The name of the channel commands arrive on.
    pub fn command_channel(&self) -> &str {
        &self.command_channel
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn controller(&self) -> &Arc<CallController> {
        &self.controller
    }

    /// The in-call callback surface.
    pub fn tracker(&self) -> &CallTracker {
        self.controller.tracker()
    }

    pub fn host(&self) -> &HostCallbacks {
        &self.host
    }

    pub async fn handle_method_call(&self, call: MethodCall) -> MethodResponse {
        self.controller.handle_method_call(call).await
    }

    /// Decodes a JSON method call, runs it and encodes the reply.
    ///
    /// Only malformed input is an `Err`; command failures are encoded in the
    /// reply.
    ///
    /// 解码JSON方法调用，执行并编码回复。只有格式错误的输入才返回 `Err`；命令失败会编码在回复中。
    pub async fn handle_method_json(&self, request: &str) -> Result<String> {
        let call: MethodCall = serde_json::from_str(request)?;
        debug!(channel = %self.command_channel, method = %call.method, "Decoded method call");
        let response = self.controller.handle_method_call(call).await;
        Ok(serde_json::to_string(&response)?)
    }
}
