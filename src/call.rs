//! Types describing calls as the host telephony framework reports them.
//!
//! 描述宿主电话框架所报告呼叫的类型。

use crate::{error::Result, event::UNKNOWN_NUMBER};
use std::fmt::{self, Debug};

/// Identifies a call object for as long as the host keeps it alive.
///
/// 在宿主保持呼叫对象存活期间标识该对象。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(pub u64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

/// Direction of a call relative to this device.
///
/// 相对于本设备的呼叫方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Call states reported by the host framework.
///
/// 宿主框架报告的呼叫状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    New,
    Dialing,
    Ringing,
    Holding,
    Active,
    Disconnected,
    SelectPhoneAccount,
    Connecting,
    Disconnecting,
    PullingCall,
    AudioProcessing,
    SimulatedRinging,
}

impl CallState {
    /// Maps the framework's integer state code. Unknown codes yield `None`.
    ///
    /// 映射框架的整数状态码。未知状态码返回 `None`。
    pub fn from_raw(code: i32) -> Option<Self> {
        let state = match code {
            0 => CallState::New,
            1 => CallState::Dialing,
            2 => CallState::Ringing,
            3 => CallState::Holding,
            4 => CallState::Active,
            7 => CallState::Disconnected,
            8 => CallState::SelectPhoneAccount,
            9 => CallState::Connecting,
            10 => CallState::Disconnecting,
            11 => CallState::PullingCall,
            12 => CallState::AudioProcessing,
            13 => CallState::SimulatedRinging,
            _ => return None,
        };
        Some(state)
    }
}

/// Immutable details of a call captured from the host.
///
/// 从宿主捕获的呼叫的不可变详情。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDetails {
    pub direction: Direction,
    /// The call's address handle, usually a `tel:` URI.
    /// 呼叫的地址句柄，通常是 `tel:` URI。
    pub handle: Option<String>,
}

impl CallDetails {
    /// The phone number behind the handle, or `Unknown`.
    pub fn number(&self) -> String {
        resolve_handle(self.handle.as_deref())
    }
}

/// A call object owned by the host framework.
///
/// Implementations wrap whatever the host hands to the in-call callbacks.
/// Every action may fail; callers treat failures as "try the next fallback".
///
/// 由宿主框架拥有的呼叫对象。
///
/// 实现包装宿主交给通话回调的任何对象。每个操作都可能失败；调用方将失败视为“尝试下一个后备方案”。
pub trait CallHandle: Send + Sync + Debug {
    fn id(&self) -> CallId;

    fn details(&self) -> CallDetails;

    fn state(&self) -> CallState;

    /// Answers the call, audio only.
    /// 以纯音频方式接听呼叫。
    fn answer(&self) -> Result<()>;

    /// Rejects a ringing call without a text reply.
    /// 拒接响铃中的呼叫，不附带短信回复。
    fn reject(&self) -> Result<()>;

    fn disconnect(&self) -> Result<()>;
}

/// Strips the `tel:` scheme from a call handle.
///
/// 去除呼叫句柄中的 `tel:` 方案。
pub fn scheme_specific_part(handle: &str) -> &str {
    handle.strip_prefix("tel:").unwrap_or(handle)
}

/// Resolves an optional handle to a phone number, falling back to `Unknown`.
///
/// 将可选句柄解析为电话号码，缺失时回退为 `Unknown`。
pub fn resolve_handle(handle: Option<&str>) -> String {
    handle
        .map(scheme_specific_part)
        .unwrap_or(UNKNOWN_NUMBER)
        .to_string()
}
