//! In-process transport for tests and the demo

use super::{NetConnectOptions, NetData, Socket, SocketEvent, SocketEventSink};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct LoopbackState {
    sink: Option<SocketEventSink>,
    open: bool,
    auto_accept: bool,
    refuse: bool,
    echo: bool,
    connects: usize,
    closes: usize,
    sent: Vec<NetData>,
}

/// Transport whose peer is driven by the owner
///
/// Clones share state: install one clone in the manager and keep another to
/// play the server side.
#[derive(Clone, Default)]
pub struct LoopbackSocket {
    state: Rc<RefCell<LoopbackState>>,
}

impl LoopbackSocket {
    /// Transport that waits for [`accept`](Self::accept)
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept every connection attempt immediately
    pub fn set_auto_accept(&self, enabled: bool) {
        self.state.borrow_mut().auto_accept = enabled;
    }

    /// Make `connect` fail to start
    pub fn set_refuse(&self, refuse: bool) {
        self.state.borrow_mut().refuse = refuse;
    }

    /// Reflect every sent frame back as a received message
    pub fn set_echo(&self, enabled: bool) {
        self.state.borrow_mut().echo = enabled;
    }

    fn emit(&self, event: SocketEvent) {
        if let Some(sink) = &self.state.borrow().sink {
            sink.push(event);
        }
    }

    /// Complete the pending connection
    pub fn accept(&self) {
        self.state.borrow_mut().open = true;
        self.emit(SocketEvent::Connected);
    }

    /// Deliver a frame from the server
    pub fn receive(&self, data: NetData) {
        self.emit(SocketEvent::Message(data));
    }

    /// Simulate the server dropping the connection
    pub fn drop_connection(&self) {
        let was_open = std::mem::take(&mut self.state.borrow_mut().open);
        if was_open {
            self.emit(SocketEvent::Error("connection reset".to_string()));
            self.emit(SocketEvent::Closed {
                code: 1006,
                reason: "connection reset".to_string(),
            });
        }
    }

    /// Frames sent so far
    pub fn sent(&self) -> Vec<NetData> {
        self.state.borrow().sent.clone()
    }

    /// Number of `connect` calls
    pub fn connect_count(&self) -> usize {
        self.state.borrow().connects
    }

    /// Number of `close` calls
    pub fn close_count(&self) -> usize {
        self.state.borrow().closes
    }
}

impl Socket for LoopbackSocket {
    fn connect(&mut self, options: &NetConnectOptions, events: SocketEventSink) -> bool {
        let accept = {
            let mut state = self.state.borrow_mut();
            state.connects += 1;
            if state.refuse {
                return false;
            }
            log::debug!(target: crate::foundation::logging::TARGET_NET, "Loopback connect to {:?}", options.url());
            state.sink = Some(events);
            state.auto_accept
        };
        if accept {
            self.accept();
        }
        true
    }

    fn send(&mut self, data: &NetData) -> usize {
        let echo = {
            let mut state = self.state.borrow_mut();
            state.sent.push(data.clone());
            state.echo
        };
        if echo {
            self.receive(data.clone());
        }
        data.len()
    }

    fn close(&mut self, code: Option<u16>, reason: Option<&str>) {
        let was_open = {
            let mut state = self.state.borrow_mut();
            state.closes += 1;
            std::mem::take(&mut state.open)
        };
        if was_open {
            self.emit(SocketEvent::Closed {
                code: code.unwrap_or(1000),
                reason: reason.unwrap_or_default().to_string(),
            });
        }
    }
}
