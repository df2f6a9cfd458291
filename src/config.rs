//! 定义了桥接层的可配置参数。
//! Defines configurable parameters for the dialer bridge.

/// A structure containing all configurable parameters of the bridge.
///
/// 包含桥接层所有可配置参数的结构体。
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Event dispatcher parameters.
    /// 事件调度器参数。
    pub dispatcher: DispatcherConfig,

    /// Command surface parameters.
    /// 命令接口参数。
    pub commands: CommandConfig,

    /// Telecom and call-control parameters.
    /// 电信与呼叫控制参数。
    pub telecom: TelecomConfig,

    /// Incoming-call notification parameters.
    /// 来电通知参数。
    pub notification: NotificationConfig,
}

/// Event dispatcher parameters.
///
/// 事件调度器参数。
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// The name of the channel call events are delivered on.
    /// 投递呼叫事件的通道名称。
    pub channel_name: String,
    /// The maximum number of deliveries the delivery task pulls off its queue
    /// before handing them to transports in one pass.
    /// 投递任务在一轮中从队列取出的最大投递数。
    pub delivery_batch_size: usize,
}

/// Command surface parameters.
///
/// 命令接口参数。
#[derive(Debug, Clone)]
pub struct CommandConfig {
    /// The name of the channel commands arrive on.
    /// 接收命令的通道名称。
    pub channel_name: String,
}

/// Telecom and call-control parameters.
///
/// 电信与呼叫控制参数。
#[derive(Debug, Clone)]
pub struct TelecomConfig {
    /// The id of the phone account registered with the telecom service.
    /// 在电信服务中注册的电话账户ID。
    pub phone_account_id: String,
    /// The user-visible label of that phone account.
    /// 该电话账户的用户可见标签。
    pub phone_account_label: String,
    /// The key code injected to hang up when every API-level attempt failed.
    /// 当所有API级尝试都失败时注入的挂断按键码。
    pub end_call_key_code: u32,
}

/// Incoming-call notification parameters.
///
/// 来电通知参数。
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub channel_id: String,
    pub channel_name: String,
    pub notification_id: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            channel_name: "app.call_manager/call".to_string(),
            delivery_batch_size: 64,
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            channel_name: "app.call_manager/role".to_string(),
        }
    }
}

impl Default for TelecomConfig {
    fn default() -> Self {
        Self {
            phone_account_id: "UmarDialerAccount".to_string(),
            phone_account_label: "Umar Dialer".to_string(),
            end_call_key_code: 6, // KEYCODE_ENDCALL
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel_id: "incoming_call_channel".to_string(),
            channel_name: "Incoming Calls".to_string(),
            notification_id: 1001,
        }
    }
}
