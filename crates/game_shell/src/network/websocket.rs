//! Websocket connection state machine
//!
//! Closed → Connecting → Checking → Working, back to Closed on close. Timers
//! run on the host clock fed through [`WebSocketManager::update`]:
//! - heartbeat: sends the protocol keep-alive frame when idle
//! - receive: closes a connection that stayed silent too long
//! - reconnect: reconnects after a drop while the budget allows

use super::{
    NetConnectOptions, NetData, NetError, NetNodeState, NetTipsType, NetworkTips, ProtocolHelper,
    Socket, SocketEvent, SocketEventSink,
};
use crate::core::config::NetSettings;
use crate::foundation::collections::TimerId;
use crate::foundation::logging::TARGET_NET;
use crate::foundation::time::TimerQueue;
use std::collections::VecDeque;

/// Result of a successful [`WebSocketManager::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the transport; bytes written
    Sent(usize),
    /// Held until the connection reaches `Working`
    Queued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetTimer {
    Heartbeat,
    Receive,
    Reconnect,
}

/// Message callback
pub type MessageHandler = Box<dyn FnMut(&NetData)>;

/// Connection manager around a pluggable [`Socket`]
pub struct WebSocketManager {
    socket: Option<Box<dyn Socket>>,
    tips: Option<Box<dyn NetworkTips>>,
    protocol: Option<Box<dyn ProtocolHelper>>,
    handler: Option<MessageHandler>,
    events: SocketEventSink,
    settings: NetSettings,
    options: Option<NetConnectOptions>,
    auto_reconnect: i32,
    state: NetNodeState,
    manual_close: bool,
    requests: VecDeque<NetData>,
    timers: TimerQueue<NetTimer>,
    heartbeat_timer: Option<TimerId>,
    receive_timer: Option<TimerId>,
    reconnect_timer: Option<TimerId>,
}

impl WebSocketManager {
    /// Create a manager with no transport
    pub fn new(settings: NetSettings) -> Self {
        Self {
            socket: None,
            tips: None,
            protocol: None,
            handler: None,
            events: SocketEventSink::new(),
            settings,
            options: None,
            auto_reconnect: 0,
            state: NetNodeState::Closed,
            manual_close: false,
            requests: VecDeque::new(),
            timers: TimerQueue::new(),
            heartbeat_timer: None,
            receive_timer: None,
            reconnect_timer: None,
        }
    }

    /// Install the transport and optional prompts
    pub fn init(&mut self, socket: Box<dyn Socket>, tips: Option<Box<dyn NetworkTips>>) {
        log::info!(target: TARGET_NET, "Network initialized");
        self.socket = Some(socket);
        self.tips = tips;
    }

    /// Install the protocol helper providing heartbeat frames
    pub fn set_protocol_helper(&mut self, helper: Box<dyn ProtocolHelper>) {
        self.protocol = Some(helper);
    }

    /// Callback for every received frame
    pub fn set_message_handler(&mut self, handler: impl FnMut(&NetData) + 'static) {
        self.handler = Some(Box::new(handler));
    }

    /// Current state
    pub const fn state(&self) -> NetNodeState {
        self.state
    }

    /// Frames queued while connecting
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Options of the last connect
    pub const fn connect_options(&self) -> Option<&NetConnectOptions> {
        self.options.as_ref()
    }

    /// Whether a drop will trigger a reconnect
    pub const fn is_auto_reconnect(&self) -> bool {
        self.auto_reconnect != 0
    }

    /// Start connecting; only allowed from `Closed`
    pub fn connect(&mut self, options: NetConnectOptions) -> bool {
        if self.state != NetNodeState::Closed {
            log::warn!(target: TARGET_NET, "connect ignored while {:?}", self.state);
            return false;
        }
        let Some(socket) = self.socket.as_mut() else {
            log::error!(target: TARGET_NET, "connect called before init");
            return false;
        };

        self.state = NetNodeState::Connecting;
        self.manual_close = false;
        if !socket.connect(&options, self.events.clone()) {
            log::error!(target: TARGET_NET, "Connection to {:?} could not start", options.url());
            self.state = NetNodeState::Closed;
            self.update_tips(NetTipsType::Connecting, false);
            return false;
        }

        if self.options.is_none() {
            if let Some(budget) = options.auto_reconnect {
                self.auto_reconnect = budget;
            }
        }
        log::info!(target: TARGET_NET, "Connecting to {:?}", options.url());
        self.options = Some(options);
        self.update_tips(NetTipsType::Connecting, true);
        self.pump_events();
        true
    }

    /// Send a frame
    ///
    /// Sends immediately when `Working` or when `force` is set, queues while
    /// connecting, and fails while closed.
    pub fn send(&mut self, data: NetData, force: bool) -> Result<SendOutcome, NetError> {
        match self.state {
            NetNodeState::Working => self.transmit(&data).map(SendOutcome::Sent),
            _ if force => self.transmit(&data).map(SendOutcome::Sent),
            NetNodeState::Connecting | NetNodeState::Checking => {
                log::debug!(target: TARGET_NET, "Busy ({:?}), frame queued", self.state);
                self.requests.push_back(data);
                Ok(SendOutcome::Queued)
            }
            NetNodeState::Closed => {
                log::error!(target: TARGET_NET, "Cannot send while closed");
                Err(NetError::NotConnected(self.state))
            }
        }
    }

    fn transmit(&mut self, data: &NetData) -> Result<usize, NetError> {
        let socket = self.socket.as_mut().ok_or(NetError::NoSocket)?;
        let written = socket.send(data);
        self.reset_heartbeat_timer();
        self.reset_receive_timer();
        Ok(written)
    }

    /// Close the connection; no reconnect follows
    pub fn close(&mut self, code: Option<u16>, reason: Option<&str>) {
        self.clear_timers();
        self.requests.clear();
        if let Some(tips) = self.tips.as_mut() {
            tips.connect_tips(false);
            tips.reconnect_tips(false);
            tips.request_tips(false);
        }
        self.manual_close = true;
        if let Some(socket) = self.socket.as_mut() {
            socket.close(code, reason);
        }
        self.pump_events();
        self.state = NetNodeState::Closed;
    }

    /// Disable reconnecting and cancel a pending reconnect
    pub fn reject_reconnect(&mut self) {
        self.auto_reconnect = 0;
        let waiting = self.reconnect_timer.is_some();
        self.clear_timers();
        if waiting {
            self.state = NetNodeState::Closed;
            self.update_tips(NetTipsType::ReConnecting, false);
        }
    }

    /// Process transport events and fire due timers at time `now` (seconds)
    pub fn update(&mut self, now: f64) {
        self.pump_events();
        for timer in self.timers.advance(now) {
            match timer {
                NetTimer::Heartbeat => {
                    self.heartbeat_timer = None;
                    self.on_heartbeat();
                }
                NetTimer::Receive => {
                    self.receive_timer = None;
                    log::warn!(target: TARGET_NET, "Nothing received for {}s, closing", self.settings.receive_timeout);
                    if let Some(socket) = self.socket.as_mut() {
                        socket.close(None, Some("receive timeout"));
                    }
                }
                NetTimer::Reconnect => {
                    self.reconnect_timer = None;
                    self.reconnect();
                }
            }
            self.pump_events();
        }
    }

    fn pump_events(&mut self) {
        while let Some(event) = self.events.pop() {
            match event {
                SocketEvent::Connected => self.on_connected(),
                SocketEvent::Message(data) => self.on_message(&data),
                SocketEvent::Error(error) => log::error!(target: TARGET_NET, "Socket error: {error}"),
                SocketEvent::Closed { code, reason } => self.on_closed(code, &reason),
            }
        }
    }

    fn on_connected(&mut self) {
        log::info!(target: TARGET_NET, "Connected");
        self.state = NetNodeState::Working;
        self.update_tips(NetTipsType::Connecting, false);
        self.update_tips(NetTipsType::ReConnecting, false);
        self.reset_heartbeat_timer();
        self.reset_receive_timer();

        while self.state == NetNodeState::Working {
            let Some(data) = self.requests.pop_front() else {
                break;
            };
            if let Err(error) = self.transmit(&data) {
                log::error!(target: TARGET_NET, "Queued frame dropped: {error}");
            }
        }
    }

    fn on_message(&mut self, data: &NetData) {
        log::debug!(target: TARGET_NET, "Received {} bytes", data.len());
        self.reset_receive_timer();
        self.reset_heartbeat_timer();
        if let Some(handler) = self.handler.as_mut() {
            handler(data);
        }
    }

    fn on_closed(&mut self, code: u16, reason: &str) {
        log::warn!(target: TARGET_NET, "Closed ({code}) {reason}");
        self.clear_timers();
        if self.manual_close {
            self.state = NetNodeState::Closed;
            return;
        }

        if self.is_auto_reconnect() {
            self.state = NetNodeState::Connecting;
            self.update_tips(NetTipsType::ReConnecting, true);
            self.reconnect_timer = Some(
                self.timers
                    .schedule(self.settings.reconnect_delay, NetTimer::Reconnect),
            );
        } else {
            self.state = NetNodeState::Closed;
        }
    }

    fn reconnect(&mut self) {
        let Some(options) = self.options.clone() else {
            self.state = NetNodeState::Closed;
            return;
        };
        log::info!(target: TARGET_NET, "Reconnecting ({} attempts left)", self.auto_reconnect);

        self.manual_close = true;
        if let Some(socket) = self.socket.as_mut() {
            socket.close(None, None);
        }
        self.pump_events();
        self.state = NetNodeState::Closed;

        let started = self.connect(options);
        if self.auto_reconnect > 0 {
            self.auto_reconnect -= 1;
        }
        if !started && self.is_auto_reconnect() {
            self.reconnect_timer = Some(
                self.timers
                    .schedule(self.settings.reconnect_delay, NetTimer::Reconnect),
            );
            self.state = NetNodeState::Connecting;
        }
    }

    fn on_heartbeat(&mut self) {
        if self.state != NetNodeState::Working {
            return;
        }
        let frame = self.protocol.as_ref().map(|protocol| protocol.heartbeat());
        match frame {
            Some(frame) => {
                log::debug!(target: TARGET_NET, "Sending heartbeat");
                if let Err(error) = self.transmit(&frame) {
                    log::error!(target: TARGET_NET, "Heartbeat failed: {error}");
                }
            }
            None => self.reset_heartbeat_timer(),
        }
    }

    fn reset_heartbeat_timer(&mut self) {
        if let Some(timer) = self.heartbeat_timer.take() {
            self.timers.cancel(timer);
        }
        self.heartbeat_timer = Some(
            self.timers
                .schedule(self.settings.heartbeat_interval, NetTimer::Heartbeat),
        );
    }

    fn reset_receive_timer(&mut self) {
        if let Some(timer) = self.receive_timer.take() {
            self.timers.cancel(timer);
        }
        self.receive_timer = Some(
            self.timers
                .schedule(self.settings.receive_timeout, NetTimer::Receive),
        );
    }

    fn clear_timers(&mut self) {
        for timer in [
            self.heartbeat_timer.take(),
            self.receive_timer.take(),
            self.reconnect_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.timers.cancel(timer);
        }
    }

    fn update_tips(&mut self, kind: NetTipsType, show: bool) {
        let Some(tips) = self.tips.as_mut() else {
            return;
        };
        match kind {
            NetTipsType::Connecting => tips.connect_tips(show),
            NetTipsType::ReConnecting => tips.reconnect_tips(show),
            NetTipsType::Requesting => tips.request_tips(show),
        }
    }
}
