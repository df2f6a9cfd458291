//! The delivery task that hands events to transports.
//!
//! 将事件交给传输的投递任务。

use super::{command::DeliveryCommand, transport::EventTransport};
use crate::event::CallEvent;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// The dedicated task all deliveries run on.
/// It is the only place transports are written to, so deliveries never overlap
/// and leave in exactly the order they were dispatched.
///
/// 所有投递都在其上运行的专用任务。
/// 这是唯一写入传输的地方，因此投递不会重叠，并严格按调度顺序发出。
pub(crate) async fn delivery_task(
    mut rx: mpsc::UnboundedReceiver<DeliveryCommand>,
    batch_size: usize,
) {
    let batch_size = batch_size.max(1);
    let mut commands = Vec::with_capacity(batch_size);

    loop {
        let first_cmd = match rx.recv().await {
            Some(cmd) => cmd,
            None => {
                debug!("Delivery task exiting, all dispatcher handles dropped");
                return;
            }
        };
        commands.push(first_cmd);

        while commands.len() < batch_size {
            match rx.try_recv() {
                Ok(cmd) => commands.push(cmd),
                Err(_) => break,
            }
        }

        trace!(count = commands.len(), "Delivery task processing batch");

        for command in commands.drain(..) {
            match command {
                DeliveryCommand::Deliver { transport, event } => {
                    deliver(transport.as_ref(), &event).await;
                }
                DeliveryCommand::Flush { response_tx } => {
                    let _ = response_tx.send(());
                }
            }
        }
    }
}

async fn deliver(transport: &dyn EventTransport, event: &CallEvent) {
    debug!(
        channel = transport.channel_name(),
        method = event.method(),
        "Delivering call event"
    );
    if let Err(e) = transport.deliver(event.to_message()).await {
        // Best effort: the event is dropped, there is no retry.
        error!(
            channel = transport.channel_name(),
            method = event.method(),
            "Failed to deliver call event: {}",
            e
        );
    }
}
