//! Ordered fallback chains of named strategies.
//!
//! A chain tries its strategies in order until one reports success. Errors and
//! panics raised by a strategy are caught and turned into "try the next one";
//! only a non-recoverable error stops the chain early.
//!
//! 由命名策略组成的有序后备链。
//!
//! 链按顺序尝试其策略，直到某个策略报告成功。策略引发的错误和panic会被捕获并转为“尝试下一个”；
//! 只有不可恢复的错误才会提前终止链。

use crate::error::{Error, Result};
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{debug, info, warn};

/// One alternative way of carrying out an action.
///
/// `Ok(true)` means the action was carried out, `Ok(false)` that the strategy
/// did not apply (nothing to act on, no handler resolved), `Err` that the
/// underlying API refused or failed.
///
/// 执行某个动作的一种备选方式。
///
/// `Ok(true)` 表示动作已执行，`Ok(false)` 表示该策略不适用（没有可操作对象或没有处理者），
/// `Err` 表示底层API拒绝或失败。
pub trait Strategy<I: ?Sized>: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self, input: &I) -> Result<bool>;
}

/// What a single attempt produced.
#[derive(Debug)]
pub enum AttemptResult {
    Succeeded,
    Declined,
    Failed(Error),
    Panicked(String),
}

/// A record of one strategy attempt.
#[derive(Debug)]
pub struct Attempt {
    pub strategy: &'static str,
    pub result: AttemptResult,
}

/// The outcome of running a chain.
///
/// 运行后备链的结果。
#[derive(Debug, Default)]
pub struct ChainOutcome {
    /// The strategy that succeeded, if any.
    /// 成功的策略（如有）。
    pub succeeded_by: Option<&'static str>,
    /// Every attempt made, in order.
    /// 按顺序记录的每次尝试。
    pub attempts: Vec<Attempt>,
}

impl ChainOutcome {
    pub fn is_success(&self) -> bool {
        self.succeeded_by.is_some()
    }

    /// The message of the first attempt that faulted unexpectedly.
    pub fn fault(&self) -> Option<&str> {
        self.attempts.iter().find_map(|attempt| match &attempt.result {
            AttemptResult::Panicked(message) => Some(message.as_str()),
            _ => None,
        })
    }

    /// The last attempt made, if any.
    pub fn last(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    /// The names of the strategies that were tried.
    pub fn tried(&self) -> Vec<&'static str> {
        self.attempts.iter().map(|attempt| attempt.strategy).collect()
    }
}

/// An ordered list of strategies for one action.
///
/// 一个动作的有序策略列表。
pub struct FallbackChain<I: ?Sized> {
    name: &'static str,
    strategies: Vec<Arc<dyn Strategy<I>>>,
}

impl<I: ?Sized> FallbackChain<I> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy, builder style.
    pub fn with(mut self, strategy: impl Strategy<I> + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Arc<dyn Strategy<I>>) {
        self.strategies.push(strategy);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs the strategies in order until one succeeds.
    ///
    /// 按顺序运行策略，直到某个策略成功。
    pub fn run(&self, input: &I) -> ChainOutcome {
        let mut outcome = ChainOutcome::default();

        for strategy in &self.strategies {
            let name = strategy.name();
            let result = match panic::catch_unwind(AssertUnwindSafe(|| strategy.attempt(input))) {
                Ok(Ok(true)) => AttemptResult::Succeeded,
                Ok(Ok(false)) => AttemptResult::Declined,
                Ok(Err(e)) => AttemptResult::Failed(e),
                Err(payload) => AttemptResult::Panicked(panic_message(payload.as_ref())),
            };

            let stop = match &result {
                AttemptResult::Succeeded => {
                    info!(chain = self.name, strategy = name, "Fallback strategy succeeded");
                    outcome.succeeded_by = Some(name);
                    true
                }
                AttemptResult::Declined => {
                    debug!(chain = self.name, strategy = name, "Strategy did not apply");
                    false
                }
                AttemptResult::Failed(e) => {
                    warn!(chain = self.name, strategy = name, "Strategy failed: {}", e);
                    !e.is_recoverable()
                }
                AttemptResult::Panicked(message) => {
                    warn!(chain = self.name, strategy = name, "Strategy faulted: {}", message);
                    false
                }
            };

            outcome.attempts.push(Attempt {
                strategy: name,
                result,
            });
            if stop {
                break;
            }
        }

        if !outcome.is_success() {
            warn!(chain = self.name, tried = ?outcome.tried(), "Every fallback strategy failed");
        }
        outcome
    }
}

impl<I: ?Sized> fmt::Debug for FallbackChain<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("name", &self.name)
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
