//! Transport abstraction for delivering call events to the application shell.
//!
//! 向应用外壳投递呼叫事件的传输抽象。

use crate::{
    error::{Error, Result},
    event::EventMessage,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tokio::sync::mpsc;
use tracing::debug;

/// The channel over which events reach the receiving application shell.
///
/// Deliveries are always made from the dispatcher's single delivery task, one
/// at a time and in dispatch order.
///
/// 事件到达接收端应用外壳的通道。
///
/// 投递总是由调度器唯一的投递任务发起，一次一个，并按调度顺序进行。
#[async_trait]
pub trait EventTransport: Send + Sync + Debug + 'static {
    /// Hands one message to the receiving side.
    ///
    /// 将一条消息交给接收端。
    async fn deliver(&self, message: EventMessage) -> Result<()>;

    /// The name of the channel this transport is bound to.
    ///
    /// 此传输绑定的通道名称。
    fn channel_name(&self) -> &str;
}

/// Creates transports on demand, e.g. from a messenger that outlives any one
/// channel instance.
///
/// 按需创建传输，例如从生命周期长于单个通道实例的信使创建。
pub trait TransportFactory: Send + Sync + Debug + 'static {
    /// Opens a new transport on the named channel.
    ///
    /// 在指定名称的通道上打开新的传输。
    fn open(&self, channel_name: &str) -> Result<Arc<dyn EventTransport>>;
}

/// An in-process transport backed by an unbounded tokio channel.
///
/// 基于无界tokio通道的进程内传输。
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    channel_name: String,
    tx: mpsc::UnboundedSender<EventMessage>,
}

impl ChannelTransport {
    /// Creates a transport and the receiver the shell reads events from.
    ///
    /// 创建传输以及应用外壳读取事件的接收端。
    pub fn new(channel_name: impl Into<String>) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            channel_name: channel_name.into(),
            tx,
        };
        (transport, EventReceiver { rx })
    }
}

#[async_trait]
impl EventTransport for ChannelTransport {
    async fn deliver(&self, message: EventMessage) -> Result<()> {
        self.tx.send(message).map_err(|_| Error::ChannelClosed)
    }

    fn channel_name(&self) -> &str {
        &self.channel_name
    }
}

/// The receiving end of a [`ChannelTransport`].
///
/// [`ChannelTransport`] 的接收端。
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<EventMessage>,
}

impl EventReceiver {
    /// Waits for the next delivered event.
    ///
    /// 等待下一个已投递的事件。
    pub async fn recv(&mut self) -> Result<EventMessage> {
        self.rx.recv().await.ok_or(Error::ChannelClosed)
    }

    /// Returns an already delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<EventMessage> {
        self.rx.try_recv().ok()
    }
}

/// A factory whose transports all feed the same receiver, the way every
/// channel opened from one messenger reaches the same shell.
///
/// 一个工厂，其创建的所有传输都汇入同一个接收端，就像从同一个信使打开的每个通道都到达同一个应用外壳。
#[derive(Debug, Clone)]
pub struct ChannelTransportFactory {
    tx: mpsc::UnboundedSender<EventMessage>,
}

impl ChannelTransportFactory {
    pub fn new() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, EventReceiver { rx })
    }
}

impl TransportFactory for ChannelTransportFactory {
    fn open(&self, channel_name: &str) -> Result<Arc<dyn EventTransport>> {
        if self.tx.is_closed() {
            return Err(Error::ChannelClosed);
        }
        debug!(channel = channel_name, "Opening channel transport from factory");
        Ok(Arc::new(ChannelTransport {
            channel_name: channel_name.to_string(),
            tx: self.tx.clone(),
        }))
    }
}
