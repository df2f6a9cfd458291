//! The event dispatcher: a bridge from OS-callback threads to the shell's
//! event channel.
//!
//! Callbacks may fire on any thread and before the shell has attached a
//! transport. Events emitted without a transport wait in a FIFO pending queue
//! and are drained, in order, through the next transport to be attached.
//! All deliveries run on a single delivery task.
//!
//! 事件调度器：从操作系统回调线程到应用外壳事件通道的桥梁。
//!
//! 回调可能在任何线程上、在应用外壳挂接传输之前触发。没有传输时发出的事件在FIFO待投递队列中等待，
//! 并按顺序通过下一个挂接的传输排出。所有投递都在单个投递任务上运行。

mod command;
mod delivery;
pub mod transport;

pub use transport::{
    ChannelTransport, ChannelTransportFactory, EventReceiver, EventTransport, TransportFactory,
};

use crate::{
    config::DispatcherConfig,
    error::{Error, Result},
    event::CallEvent,
};
use command::DeliveryCommand;
use delivery::delivery_task;
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot},
};
use tracing::{debug, info, warn};

/// State guarded by the dispatcher lock. Every mutation of the pending queue
/// or the transport handle happens while holding it.
///
/// 由调度器锁保护的状态。待投递队列或传输句柄的每次修改都在持有该锁时进行。
#[derive(Debug, Default)]
struct DispatcherState {
    transport: Option<Arc<dyn EventTransport>>,
    factory: Option<Arc<dyn TransportFactory>>,
    pending: VecDeque<CallEvent>,
}

#[derive(Debug)]
struct DispatcherInner {
    state: Mutex<DispatcherState>,
    delivery_tx: mpsc::UnboundedSender<DeliveryCommand>,
    channel_name: String,
}

/// A handle to the event dispatcher.
///
/// Cloning is cheap; all clones share the same queue, transport and delivery
/// task. Construct one at application start and hand clones to every callback
/// handler that emits events.
///
/// 事件调度器的句柄。
///
/// 克隆开销很小；所有克隆共享同一个队列、传输和投递任务。
/// 在应用启动时构造一个，并将克隆交给每个发出事件的回调处理器。
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    inner: Arc<DispatcherInner>,
}

impl EventDispatcher {
    /// Creates a dispatcher whose delivery task runs on the current tokio runtime.
    ///
    /// 创建一个调度器，其投递任务在当前tokio运行时上运行。
    pub fn new(config: &DispatcherConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::RuntimeUnavailable)?;
        Ok(Self::spawn_on(config, &runtime))
    }

    /// Creates a dispatcher whose delivery task runs on the given runtime.
    ///
    /// 创建一个调度器，其投递任务在给定的运行时上运行。
    pub fn spawn_on(config: &DispatcherConfig, runtime: &Handle) -> Self {
        let (delivery_tx, delivery_rx) = mpsc::unbounded_channel();
        runtime.spawn(delivery_task(delivery_rx, config.delivery_batch_size));

        info!(channel = %config.channel_name, "Event dispatcher created");

        Self {
            inner: Arc::new(DispatcherInner {
                state: Mutex::new(DispatcherState::default()),
                delivery_tx,
                channel_name: config.channel_name.clone(),
            }),
        }
    }

    /// Installs `transport` as the current transport and drains any pending
    /// events through it, in enqueue order, before later events are accepted.
    ///
    /// Attaching again (the same or a new transport) is a rebind.
    ///
    /// 将 `transport` 安装为当前传输，并在接受后续事件之前，按入队顺序通过它排出所有待投递事件。
    ///
    /// 再次挂接（相同或新的传输）即为重新绑定。
    pub fn attach(&self, transport: Arc<dyn EventTransport>) {
        let mut state = self.inner.state.lock();
        let rebind = state.transport.is_some();
        info!(
            channel = transport.channel_name(),
            rebind,
            pending = state.pending.len(),
            "Attaching event transport"
        );
        state.transport = Some(transport.clone());
        self.drain_locked(&mut state, &transport);
    }

    /// Remembers `factory` so a transport can be reopened whenever none is
    /// attached, and attaches one opened from it right away.
    ///
    /// 记住 `factory`，以便在没有挂接传输时重新打开，并立即挂接一个由它打开的传输。
    pub fn initialize(&self, factory: Arc<dyn TransportFactory>) -> Result<()> {
        debug!(channel = %self.inner.channel_name, "Initializing dispatcher with transport factory");
        let transport = factory.open(&self.inner.channel_name)?;

        let mut state = self.inner.state.lock();
        state.factory = Some(factory);
        state.transport = Some(transport.clone());
        self.drain_locked(&mut state, &transport);
        Ok(())
    }

    /// Clears the current transport, returning it.
    ///
    /// Later events are queued, unless a factory was installed with
    /// [`initialize`](Self::initialize), in which case the next emit reopens a
    /// transport from it.
    ///
    /// 清除当前传输并将其返回。
    pub fn detach(&self) -> Option<Arc<dyn EventTransport>> {
        let detached = self.inner.state.lock().transport.take();
        if let Some(transport) = &detached {
            info!(channel = transport.channel_name(), "Detached event transport");
        }
        detached
    }

    /// Whether a transport is currently attached.
    pub fn is_attached(&self) -> bool {
        self.inner.state.lock().transport.is_some()
    }

    /// The number of events waiting for a transport.
    ///
    /// 等待传输的事件数量。
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Emits an event.
    ///
    /// With a transport attached, any still-pending events are dispatched first,
    /// then `event`. Without one, `event` is queued. The call never blocks on
    /// delivery and never fails; delivery errors are logged and the event dropped.
    ///
    /// 发出一个事件。
    ///
    /// 若已挂接传输，先调度所有仍待投递的事件，再调度 `event`；否则将 `event` 入队。
    /// 此调用从不因投递而阻塞，也从不失败；投递错误会被记录，事件被丢弃。
    pub fn emit(&self, event: CallEvent) {
        debug!(%event, "Emitting call event");
        let mut state = self.inner.state.lock();

        let transport = match state.transport.clone() {
            Some(transport) => Some(transport),
            None => self.reopen_locked(&mut state),
        };

        match transport {
            Some(transport) => {
                self.drain_locked(&mut state, &transport);
                self.schedule(transport, event);
            }
            None => {
                warn!(method = event.method(), "No transport attached; queuing event");
                state.pending.push_back(event);
            }
        }
    }

    pub fn emit_incoming_call(&self, number: Option<&str>) {
        self.emit(CallEvent::incoming_call(number));
    }

    pub fn emit_incoming_call_connected(&self, number: Option<&str>) {
        self.emit(CallEvent::incoming_call_connected(number));
    }

    pub fn emit_outgoing_call(&self, number: Option<&str>) {
        self.emit(CallEvent::outgoing_call(number));
    }

    pub fn emit_outgoing_call_connected(&self, number: Option<&str>) {
        self.emit(CallEvent::outgoing_call_connected(number));
    }

    pub fn emit_call_ended(&self) {
        self.emit(CallEvent::CallEnded);
    }

    /// Waits until every delivery dispatched so far has been handed to its transport.
    ///
    /// Events still sitting in the pending queue are not waited for.
    ///
    /// 等待到目前为止调度的每个投递都已交给其传输。
    pub async fn flush(&self) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();
        self.inner
            .delivery_tx
            .send(DeliveryCommand::Flush { response_tx })
            .map_err(|_| Error::ChannelClosed)?;
        response_rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Opens a transport from the remembered factory. Caller holds the lock.
    fn reopen_locked(&self, state: &mut DispatcherState) -> Option<Arc<dyn EventTransport>> {
        let factory = state.factory.clone()?;
        match factory.open(&self.inner.channel_name) {
            Ok(transport) => {
                info!(channel = %self.inner.channel_name, "Reopened event transport from factory");
                state.transport = Some(transport.clone());
                Some(transport)
            }
            Err(e) => {
                warn!(channel = %self.inner.channel_name, "Failed to reopen event transport: {}", e);
                None
            }
        }
    }

    /// Moves every pending event onto the delivery queue. Caller holds the lock,
    /// so nothing emitted afterwards can overtake them.
    fn drain_locked(&self, state: &mut DispatcherState, transport: &Arc<dyn EventTransport>) {
        if state.pending.is_empty() {
            return;
        }
        debug!(
            count = state.pending.len(),
            channel = transport.channel_name(),
            "Draining queued events"
        );
        while let Some(event) = state.pending.pop_front() {
            self.schedule(transport.clone(), event);
        }
    }

    fn schedule(&self, transport: Arc<dyn EventTransport>, event: CallEvent) {
        if let Err(mpsc::error::SendError(command)) = self
            .inner
            .delivery_tx
            .send(DeliveryCommand::Deliver { transport, event })
        {
            if let DeliveryCommand::Deliver { event, .. } = command {
                warn!(method = event.method(), "Delivery task has stopped; dropping event");
            }
        }
    }
}
