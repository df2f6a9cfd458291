//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the dialer bridge.
/// 拨号桥接库的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// A phone number was required but the caller supplied none.
    /// 需要电话号码，但调用方未提供。
    #[error("Phone number is required")]
    InvalidNumber,

    /// No platform API was able to place the call.
    /// 没有任何平台API能够发起呼叫。
    #[error("Failed to initiate call")]
    NoHandler,

    /// A default-dialer role request is already outstanding.
    /// 已有一个默认拨号器角色请求正在进行。
    #[error("Another default dialer request is already running")]
    InProgress,

    /// An attempt faulted unexpectedly.
    /// 某次尝试意外出错。
    #[error("Failed to initiate call: {0}")]
    CallFailed(String),

    /// The platform refused the operation for lack of permission or role.
    /// 平台因缺少权限或角色而拒绝了该操作。
    #[error("Operation not authorized: {0}")]
    Unauthorized(String),

    /// The platform does not offer this API (absent service, old OS version).
    /// 平台不提供此API（服务缺失或系统版本过旧）。
    #[error("Operation not supported by the platform: {0}")]
    Unsupported(&'static str),

    /// The platform reported a runtime failure.
    /// 平台报告了运行时错误。
    #[error("Platform error: {0}")]
    Platform(String),

    /// An internal channel for communication between tasks was closed unexpectedly.
    /// 用于任务间通信的内部通道意外关闭。
    #[error("Internal channel is broken")]
    ChannelClosed,

    /// The dispatcher was created outside of a tokio runtime.
    /// 调度器在tokio运行时之外创建。
    #[error("No tokio runtime available to run the delivery task")]
    RuntimeUnavailable,

    /// Event arguments could not be encoded for the transport.
    /// 事件参数无法为传输编码。
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The error code reported to the application shell for a failed command.
    ///
    /// 命令失败时报告给应用外壳的错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidNumber => "INVALID_NUMBER",
            Error::NoHandler => "NO_HANDLER",
            Error::InProgress => "in_progress",
            Error::CallFailed(_) => "CALL_FAILED",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Unsupported(_) => "UNSUPPORTED",
            Error::Platform(_) => "PLATFORM_ERROR",
            Error::ChannelClosed => "CHANNEL_CLOSED",
            Error::RuntimeUnavailable => "NO_RUNTIME",
            Error::Serialization(_) => "SERIALIZATION",
        }
    }

    /// Whether a fallback chain may move on to its next strategy after this error.
    ///
    /// Everything except `InvalidNumber` and `InProgress` is recoverable by
    /// trying an alternate API.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::InvalidNumber | Error::InProgress)
    }
}
