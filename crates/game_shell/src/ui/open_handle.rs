//! One-shot result of an asynchronous window open

use crate::foundation::collections::NodeId;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Observed state of an [`OpenHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenResult {
    /// Still loading (or waiting in a dialog queue)
    Pending,
    /// Window is on stage
    Opened(NodeId),
    /// Load failed, a component refused the window, or the request was dropped
    Failed,
}

/// Resolves once with the window's root node, or `None` when the open failed
///
/// Poll it with [`try_result`](Self::try_result) from a frame loop, or `.await`
/// it from async code.
#[derive(Debug)]
pub struct OpenHandle {
    receiver: oneshot::Receiver<NodeId>,
    resolved: Option<OpenResult>,
}

impl OpenHandle {
    pub(crate) fn channel() -> (oneshot::Sender<NodeId>, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            sender,
            Self {
                receiver,
                resolved: None,
            },
        )
    }

    /// Non-blocking check; once resolved the answer never changes
    pub fn try_result(&mut self) -> OpenResult {
        if let Some(resolved) = self.resolved {
            return resolved;
        }
        let result = match self.receiver.try_recv() {
            Ok(node) => OpenResult::Opened(node),
            Err(oneshot::error::TryRecvError::Empty) => return OpenResult::Pending,
            Err(oneshot::error::TryRecvError::Closed) => OpenResult::Failed,
        };
        self.resolved = Some(result);
        result
    }
}

impl Future for OpenHandle {
    type Output = Option<NodeId>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.resolved {
            Some(OpenResult::Opened(node)) => return Poll::Ready(Some(node)),
            Some(_) => return Poll::Ready(None),
            None => {}
        }
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(node)) => {
                self.resolved = Some(OpenResult::Opened(node));
                Poll::Ready(Some(node))
            }
            Poll::Ready(Err(_)) => {
                self.resolved = Some(OpenResult::Failed);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
