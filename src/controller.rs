//! The call controller: command handlers over ordered fallback chains.
//!
//! Every command tries a preferred OS action and falls back through
//! alternates. Failures of individual attempts never escape; a command reports
//! `false` or a structured error only once its whole chain is exhausted.
//!
//! 呼叫控制器：基于有序后备链的命令处理器。
//!
//! 每个命令先尝试首选的操作系统动作，再依次回退到备选方案。单次尝试的失败从不外泄；
//! 只有整条链都用尽后，命令才会报告 `false` 或结构化错误。

pub mod fallback;
pub mod method;
mod role;
pub mod strategies;
pub mod tracker;

pub use fallback::{AttemptResult, ChainOutcome, FallbackChain, Strategy};
pub use method::{MethodCall, MethodResponse};
pub use tracker::{CallPhase, CallTracker};

use crate::{
    config::Config,
    dispatcher::EventDispatcher,
    error::{Error, Result},
    event::CallEvent,
    platform::{PhoneAccount, Platform, SettingsSurface},
};
use role::RoleRequestSlot;
use std::sync::Arc;
use strategies::{
    CallIntent, EndCallKeyInjection, EndCallMediaKey, OpenSettings, TelecomAcceptRingingCall,
    TelecomEndCall, TelecomPlaceCall, TrackedCallAnswer, TrackedCallEnd,
};
use tracing::{debug, info, warn};

/// Handles the shell's call-control commands.
///
/// 处理应用外壳的呼叫控制命令。
pub struct CallController {
    config: Config,
    platform: Arc<dyn Platform>,
    dispatcher: EventDispatcher,
    tracker: CallTracker,
    place_chain: FallbackChain<str>,
    end_chain: FallbackChain<()>,
    reject_chain: FallbackChain<()>,
    answer_chain: FallbackChain<()>,
    role_denied_chain: FallbackChain<()>,
    settings_chain: FallbackChain<()>,
    role_request: RoleRequestSlot,
}

impl CallController {
    /// Creates a controller with the default fallback chains.
    ///
    /// 使用默认后备链创建控制器。
    pub fn new(config: Config, platform: Arc<dyn Platform>, dispatcher: EventDispatcher) -> Self {
        let tracker = CallTracker::new(
            dispatcher.clone(),
            platform.clone(),
            config.notification.clone(),
        );
        let key_code = config.telecom.end_call_key_code;

        let place_chain = FallbackChain::new("place_call")
            .with(TelecomPlaceCall {
                platform: platform.clone(),
            })
            .with(CallIntent {
                platform: platform.clone(),
            });

        let end_chain = FallbackChain::new("end_call")
            .with(TrackedCallEnd {
                tracker: tracker.clone(),
            })
            .with(TelecomEndCall {
                platform: platform.clone(),
            })
            .with(EndCallKeyInjection {
                platform: platform.clone(),
                key_code,
            })
            .with(EndCallMediaKey {
                platform: platform.clone(),
                key_code,
            });

        let reject_chain = FallbackChain::new("reject_call").with(TrackedCallEnd {
            tracker: tracker.clone(),
        });

        let answer_chain = FallbackChain::new("answer_call")
            .with(TrackedCallAnswer {
                tracker: tracker.clone(),
            })
            .with(TelecomAcceptRingingCall {
                platform: platform.clone(),
            });

        let role_denied_chain = open_settings_chain(
            "role_denied",
            &platform,
            &[
                SettingsSurface::ChangeDefaultDialer,
                SettingsSurface::DefaultApps,
                SettingsSurface::AppDetails,
            ],
        );
        let settings_chain = open_settings_chain(
            "default_apps_settings",
            &platform,
            &[SettingsSurface::DefaultApps, SettingsSurface::AppDetails],
        );

        Self {
            config,
            platform,
            dispatcher,
            tracker,
            place_chain,
            end_chain,
            reject_chain,
            answer_chain,
            role_denied_chain,
            settings_chain,
            role_request: RoleRequestSlot::default(),
        }
    }

    /// Replaces the call-placement chain.
    pub fn with_place_chain(mut self, chain: FallbackChain<str>) -> Self {
        self.place_chain = chain;
        self
    }

    /// Replaces the end-call chain.
    pub fn with_end_chain(mut self, chain: FallbackChain<()>) -> Self {
        self.end_chain = chain;
        self
    }

    /// Replaces the chain tried first when rejecting a call.
    pub fn with_reject_chain(mut self, chain: FallbackChain<()>) -> Self {
        self.reject_chain = chain;
        self
    }

    /// Replaces the answer chain.
    pub fn with_answer_chain(mut self, chain: FallbackChain<()>) -> Self {
        self.answer_chain = chain;
        self
    }

    /// The tracker that receives the host's in-call callbacks.
    pub fn tracker(&self) -> &CallTracker {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Registers the configured phone account with the telecom service.
    /// Failure is logged and reported as `false`.
    ///
    /// 向电信服务注册配置的电话账户。失败时记录日志并返回 `false`。
    pub fn register_phone_account(&self) -> bool {
        let account = PhoneAccount {
            id: self.config.telecom.phone_account_id.clone(),
            label: self.config.telecom.phone_account_label.clone(),
            call_provider: true,
        };
        match self.platform.register_phone_account(&account) {
            Ok(()) => {
                info!(account = %account.id, "Phone account registered");
                true
            }
            Err(e) => {
                warn!(account = %account.id, "Failed to register phone account: {}", e);
                false
            }
        }
    }

    /// Whether this application holds the default-dialer role.
    pub fn is_default_dialer(&self) -> bool {
        self.platform.is_default_dialer()
    }

    /// Requests the default-dialer role.
    ///
    /// Resolves to `true` if the role is (or becomes) held. While the OS grant
    /// prompt is showing, a second request fails fast with
    /// [`Error::InProgress`] and leaves the first untouched. On denial, or when
    /// the OS has no requestable role, a settings screen is opened and the
    /// result is `false`.
    ///
    /// 请求默认拨号器角色。
    ///
    /// 若角色已被（或变为被）持有则返回 `true`。操作系统授权提示显示期间，第二个请求会以
    /// [`Error::InProgress`] 快速失败，且不影响第一个请求。被拒绝或操作系统没有可请求的角色时，
    /// 打开设置界面并返回 `false`。
    pub async fn request_default_dialer(&self) -> Result<bool> {
        if self.platform.is_default_dialer() {
            debug!("Already the default dialer");
            return Ok(true);
        }

        let Some(_guard) = self.role_request.try_acquire() else {
            warn!("Another default dialer request is already in progress");
            return Err(Error::InProgress);
        };

        if !self.platform.is_role_available() {
            warn!("Dialer role not available, opening settings");
            self.settings_chain.run(&());
            return Ok(false);
        }

        info!("Launching dialer role request");
        if let Err(e) = self.platform.request_dialer_role().await {
            warn!("Dialer role request failed: {}", e);
        }

        let granted = self.platform.is_default_dialer();
        info!(granted, "Dialer role request finished");
        if !granted {
            warn!("Role request denied or cancelled, falling back to settings");
            self.role_denied_chain.run(&());
        }
        Ok(granted)
    }

    /// Whether a role request is waiting on the OS prompt.
    pub fn role_request_outstanding(&self) -> bool {
        self.role_request.is_outstanding()
    }

    /// Places a call to `number`.
    ///
    /// On success an `outgoingCall` event is emitted; the connected transition
    /// arrives later through the host callbacks.
    ///
    /// 向 `number` 发起呼叫。
    ///
    /// 成功时发出 `outgoingCall` 事件；接通状态稍后通过宿主回调到达。
    pub fn place_call(&self, number: &str) -> Result<bool> {
        if number.is_empty() {
            return Err(Error::InvalidNumber);
        }
        info!(number, "Placing call");

        let outcome = self.place_chain.run(number);
        if outcome.is_success() {
            self.dispatcher.emit(CallEvent::OutgoingCall {
                number: number.to_string(),
            });
            return Ok(true);
        }

        match placement_fault(&outcome) {
            Some(fault) => {
                warn!(number, "Call placement faulted: {}", fault);
                Err(Error::CallFailed(fault))
            }
            None => {
                warn!(number, "No handler could place the call");
                Err(Error::NoHandler)
            }
        }
    }

    /// Ends the current call.
    ///
    /// Returns `false` only when every strategy failed; a `callEnded` event is
    /// emitted anyway so the shell's UI does not stay stuck on a call screen.
    ///
    /// 结束当前呼叫。
    ///
    /// 仅当所有策略都失败时返回 `false`；此时仍会发出 `callEnded` 事件，避免应用外壳界面停留在通话界面。
    pub fn end_call(&self) -> bool {
        info!("Ending call");
        let outcome = self.end_chain.run(&());
        if !outcome.is_success() {
            self.dispatcher.emit(CallEvent::CallEnded);
        }
        outcome.is_success()
    }

    /// Rejects the ringing call, falling back to [`end_call`](Self::end_call).
    ///
    /// 拒接响铃中的呼叫，失败时回退到 [`end_call`](Self::end_call)。
    pub fn reject_call(&self) -> bool {
        info!("Rejecting call");
        if self.reject_chain.run(&()).is_success() {
            return true;
        }
        self.end_call()
    }

    /// Answers the ringing call.
    ///
    /// 接听响铃中的呼叫。
    pub fn answer_call(&self) -> bool {
        info!("Answering call");
        self.answer_chain.run(&()).is_success()
    }

    /// Routes a method call from the shell to the matching command.
    ///
    /// 将来自应用外壳的方法调用路由到相应的命令。
    pub async fn handle_method_call(&self, call: MethodCall) -> MethodResponse {
        debug!(method = %call.method, "Handling method call");
        match call.method.as_str() {
            "isDefaultDialer" => MethodResponse::success(self.is_default_dialer()),
            "requestDefaultDialer" => self.request_default_dialer().await.into(),
            "makeCall" => self
                .place_call(call.argument_str("number").unwrap_or_default())
                .into(),
            "endCall" => MethodResponse::success(self.end_call()),
            "rejectCall" => MethodResponse::success(self.reject_call()),
            "answerCall" => MethodResponse::success(self.answer_call()),
            other => {
                debug!(method = other, "Method not implemented");
                MethodResponse::NotImplemented
            }
        }
    }
}

/// Why an exhausted placement chain failed unexpectedly, if it did: a strategy
/// panicked, or the final strategy hit a platform runtime failure. A final
/// `Ok(false)`, `Unsupported` or `Unauthorized` means nothing could handle the
/// call instead.
fn placement_fault(outcome: &ChainOutcome) -> Option<String> {
    if let Some(message) = outcome.fault() {
        return Some(message.to_string());
    }
    match outcome.last().map(|attempt| &attempt.result) {
        Some(AttemptResult::Failed(e @ Error::Platform(_))) => Some(e.to_string()),
        _ => None,
    }
}

fn open_settings_chain(
    name: &'static str,
    platform: &Arc<dyn Platform>,
    surfaces: &[SettingsSurface],
) -> FallbackChain<()> {
    surfaces
        .iter()
        .fold(FallbackChain::new(name), |chain, &surface| {
            chain.with(OpenSettings {
                platform: platform.clone(),
                surface,
            })
        })
}
