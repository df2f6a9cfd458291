//! Commands for the delivery task.
//!
//! 投递任务的命令。

use super::transport::EventTransport;
use crate::event::CallEvent;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Commands processed, in order, by the delivery task.
///
/// 由投递任务按顺序处理的命令。
#[derive(Debug)]
pub(crate) enum DeliveryCommand {
    /// Deliver an event through the transport that was current when it was dispatched.
    /// 通过调度时的当前传输投递一个事件。
    Deliver {
        transport: Arc<dyn EventTransport>,
        event: CallEvent,
    },
    /// Signal once every earlier command has been processed.
    /// 在之前所有命令处理完毕后发出信号。
    Flush { response_tx: oneshot::Sender<()> },
}
