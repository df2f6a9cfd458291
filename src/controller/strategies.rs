//! The concrete strategies the default fallback chains are built from.
//!
//! 默认后备链所使用的具体策略。

use super::{fallback::Strategy, tracker::CallTracker};
use crate::{
    error::Result,
    platform::{KeyAction, Platform, SettingsSurface},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Ends the call held by the tracker (reject if ringing, disconnect otherwise).
pub struct TrackedCallEnd {
    pub tracker: CallTracker,
}

impl Strategy<()> for TrackedCallEnd {
    fn name(&self) -> &'static str {
        "tracked_call_end"
    }

    fn attempt(&self, _: &()) -> Result<bool> {
        self.tracker.end_current_call()
    }
}

/// Answers the call held by the tracker.
pub struct TrackedCallAnswer {
    pub tracker: CallTracker,
}

impl Strategy<()> for TrackedCallAnswer {
    fn name(&self) -> &'static str {
        "tracked_call_answer"
    }

    fn attempt(&self, _: &()) -> Result<bool> {
        self.tracker.answer_current_call()
    }
}

/// The telecom service's own end-call API.
pub struct TelecomEndCall {
    pub platform: Arc<dyn Platform>,
}

impl Strategy<()> for TelecomEndCall {
    fn name(&self) -> &'static str {
        "telecom_end_call"
    }

    fn attempt(&self, _: &()) -> Result<bool> {
        self.platform.end_call()
    }
}

/// Injects the end-call key through the input subsystem, first with elevated
/// privilege and then without.
///
/// 通过输入子系统注入挂断键，先使用提升的权限，再不使用。
pub struct EndCallKeyInjection {
    pub platform: Arc<dyn Platform>,
    pub key_code: u32,
}

impl Strategy<()> for EndCallKeyInjection {
    fn name(&self) -> &'static str {
        "key_injection"
    }

    fn attempt(&self, _: &()) -> Result<bool> {
        match self.platform.inject_key_event(self.key_code, true) {
            Ok(()) => {
                debug!(key_code = self.key_code, "Injected end-call key with privilege");
                Ok(true)
            }
            Err(e) => {
                warn!("Privileged key injection failed: {}", e);
                self.platform.inject_key_event(self.key_code, false)?;
                debug!(key_code = self.key_code, "Injected end-call key without privilege");
                Ok(true)
            }
        }
    }
}

/// Sends the end-call key as a media key press (down, then up).
pub struct EndCallMediaKey {
    pub platform: Arc<dyn Platform>,
    pub key_code: u32,
}

impl Strategy<()> for EndCallMediaKey {
    fn name(&self) -> &'static str {
        "media_key_event"
    }

    fn attempt(&self, _: &()) -> Result<bool> {
        self.platform
            .dispatch_media_key(self.key_code, KeyAction::Down)?;
        self.platform.dispatch_media_key(self.key_code, KeyAction::Up)?;
        Ok(true)
    }
}

/// The telecom service's accept-ringing-call API.
pub struct TelecomAcceptRingingCall {
    pub platform: Arc<dyn Platform>,
}

impl Strategy<()> for TelecomAcceptRingingCall {
    fn name(&self) -> &'static str {
        "telecom_accept_ringing_call"
    }

    fn attempt(&self, _: &()) -> Result<bool> {
        self.platform.accept_ringing_call()?;
        Ok(true)
    }
}

/// Places the call through the telecom service. Only applies while this
/// application holds the default-dialer role.
///
/// 通过电信服务发起呼叫。仅在本应用持有默认拨号器角色时适用。
pub struct TelecomPlaceCall {
    pub platform: Arc<dyn Platform>,
}

impl Strategy<str> for TelecomPlaceCall {
    fn name(&self) -> &'static str {
        "telecom_place_call"
    }

    fn attempt(&self, number: &str) -> Result<bool> {
        if !self.platform.is_default_dialer() {
            return Ok(false);
        }
        self.platform.place_call(number)?;
        Ok(true)
    }
}

/// Dispatches a generic call request, targeting this application when it is
/// the default dialer so no chooser is shown.
///
/// 分派通用呼叫请求；当本应用为默认拨号器时以其为目标，从而不显示选择器。
pub struct CallIntent {
    pub platform: Arc<dyn Platform>,
}

impl Strategy<str> for CallIntent {
    fn name(&self) -> &'static str {
        "call_intent"
    }

    fn attempt(&self, number: &str) -> Result<bool> {
        let prefer_self = self.platform.is_default_dialer();
        self.platform.start_call_intent(number, prefer_self)
    }
}

/// Opens one settings screen.
pub struct OpenSettings {
    pub platform: Arc<dyn Platform>,
    pub surface: SettingsSurface,
}

impl Strategy<()> for OpenSettings {
    fn name(&self) -> &'static str {
        match self.surface {
            SettingsSurface::ChangeDefaultDialer => "change_default_dialer",
            SettingsSurface::DefaultApps => "default_apps_settings",
            SettingsSurface::AppDetails => "app_details_settings",
        }
    }

    fn attempt(&self, _: &()) -> Result<bool> {
        self.platform.open_settings(self.surface)
    }
}
