//! The operating-system services the bridge drives.
//!
//! Each method is one OS API. Default implementations report
//! [`Error::Unsupported`], so a platform only implements what it actually
//! offers and the fallback chains skip the rest.
//!
//! 桥接层驱动的操作系统服务。
//!
//! 每个方法对应一个操作系统API。默认实现返回 [`Error::Unsupported`]，
//! 因此平台只需实现其实际提供的功能，后备链会跳过其余部分。

use crate::{
    config::NotificationConfig,
    error::{Error, Result},
};
use async_trait::async_trait;

/// A phone account registered with the telecom service.
///
/// 在电信服务中注册的电话账户。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneAccount {
    pub id: String,
    pub label: String,
    /// Whether the account may place calls.
    pub call_provider: bool,
}

/// Settings screens the bridge may open when it cannot do something itself.
///
/// 当桥接层自身无法完成某事时可能打开的设置界面。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSurface {
    /// The telecom "change default dialer" prompt.
    ChangeDefaultDialer,
    /// The system's default-apps settings.
    DefaultApps,
    /// This application's details page.
    AppDetails,
}

/// Key event phases for media-key dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

/// The OS telephony surface.
///
/// 操作系统的电话服务接口。
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// Whether this application currently holds the default-dialer role.
    ///
    /// 本应用当前是否持有默认拨号器角色。
    fn is_default_dialer(&self) -> bool {
        false
    }

    fn register_phone_account(&self, _account: &PhoneAccount) -> Result<()> {
        Err(Error::Unsupported("register_phone_account"))
    }

    /// Places a call through the telecom service.
    ///
    /// 通过电信服务发起呼叫。
    fn place_call(&self, _number: &str) -> Result<()> {
        Err(Error::Unsupported("place_call"))
    }

    /// Dispatches a generic "call this number" request to whatever handles it.
    /// Returns `Ok(false)` when nothing resolves the request.
    ///
    /// 将通用的“呼叫此号码”请求分派给能处理它的组件。没有组件能处理时返回 `Ok(false)`。
    fn start_call_intent(&self, _number: &str, _prefer_self: bool) -> Result<bool> {
        Err(Error::Unsupported("start_call_intent"))
    }

    /// Asks the telecom service to end the current call.
    fn end_call(&self) -> Result<bool> {
        Err(Error::Unsupported("end_call"))
    }

    fn accept_ringing_call(&self) -> Result<()> {
        Err(Error::Unsupported("accept_ringing_call"))
    }

    /// Injects a key press through the input subsystem, optionally with
    /// elevated privilege.
    ///
    /// 通过输入子系统注入按键，可选择使用提升的权限。
    fn inject_key_event(&self, _key_code: u32, _privileged: bool) -> Result<()> {
        Err(Error::Unsupported("inject_key_event"))
    }

    fn dispatch_media_key(&self, _key_code: u32, _action: KeyAction) -> Result<()> {
        Err(Error::Unsupported("dispatch_media_key"))
    }

    /// Whether the OS offers a requestable dialer role at all.
    fn is_role_available(&self) -> bool {
        false
    }

    /// Shows the OS role-grant prompt and resolves once the user has left it,
    /// whatever the decision.
    ///
    /// 显示操作系统的角色授予提示，并在用户离开后完成，无论其决定如何。
    async fn request_dialer_role(&self) -> Result<()> {
        Err(Error::Unsupported("request_dialer_role"))
    }

    /// Opens a settings screen. `Ok(false)` when the screen does not exist.
    fn open_settings(&self, _surface: SettingsSurface) -> Result<bool> {
        Err(Error::Unsupported("open_settings"))
    }

    /// Brings the incoming call in front of the user: foreground activation
    /// or a full-screen notification.
    ///
    /// 将来电呈现给用户：前台激活或全屏通知。
    fn show_incoming_call(&self, _number: &str, _notification: &NotificationConfig) -> Result<()> {
        Err(Error::Unsupported("show_incoming_call"))
    }

    fn dismiss_incoming_call(&self, _notification_id: u32) -> Result<()> {
        Err(Error::Unsupported("dismiss_incoming_call"))
    }
}
