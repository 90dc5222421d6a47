// Dashboard session - Single event loop driving the watchdog and toggle controls
use crate::application::channel::{ChannelConnector, ChannelEvent};
use crate::application::command_gateway::{Command, CommandGateway};
use crate::application::events::{Notice, RenderEvent, UserIntent};
use crate::application::toggle_controller::{ToggleController, ToggleError};
use crate::application::watchdog::{ConnectionWatchdog, Delivery, WatchdogSignal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

pub struct DashboardSession {
    endpoint: Url,
    connector: Arc<dyn ChannelConnector>,
    gateway: Arc<dyn CommandGateway>,
    watchdog: ConnectionWatchdog,
    toggles: ToggleController,
    render: mpsc::UnboundedSender<RenderEvent>,
    reconnect_delay: Duration,
    failures_tx: mpsc::UnboundedSender<Notice>,
    failures_rx: mpsc::UnboundedReceiver<Notice>,
    last_rejected: Option<String>,
}

impl DashboardSession {
    pub fn new(
        endpoint: Url,
        connector: Arc<dyn ChannelConnector>,
        gateway: Arc<dyn CommandGateway>,
        silence_timeout: Duration,
        render: mpsc::UnboundedSender<RenderEvent>,
    ) -> Self {
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();
        Self {
            endpoint,
            connector,
            gateway,
            watchdog: ConnectionWatchdog::new(silence_timeout),
            toggles: ToggleController::new(),
            render,
            reconnect_delay: Duration::ZERO,
            failures_tx,
            failures_rx,
            last_rejected: None,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Run until the intent source goes away. Each outer iteration is one
    /// channel; a close always leads to exactly one new connect.
    pub async fn run(mut self, mut intents: mpsc::Receiver<UserIntent>) {
        loop {
            let attempt = self.watchdog.begin_attempt();
            self.last_rejected = None;
            tracing::info!(attempt, endpoint = %self.endpoint, "connecting");
            self.emit(RenderEvent::Connection(self.watchdog.state()));
            let mut channel = self.connector.connect(&self.endpoint);

            let reason = loop {
                tokio::select! {
                    event = channel.recv() => match event {
                        Some(ChannelEvent::Opened) => self.handle_open(),
                        Some(ChannelEvent::Message(raw)) => self.handle_message(raw),
                        Some(ChannelEvent::Closed(reason)) => break reason,
                        None => break None,
                    },
                    _ = silence(self.watchdog.deadline()) => self.handle_silence(),
                    intent = intents.recv() => match intent {
                        Some(intent) => self.handle_intent(intent),
                        None => {
                            tracing::info!("intent source closed, ending session");
                            return;
                        }
                    },
                    Some(notice) = self.failures_rx.recv() => self.emit(RenderEvent::Notice(notice)),
                }
            };

            self.watchdog.on_close();
            tracing::warn!(attempt, reason = ?reason, "channel closed");
            self.emit(RenderEvent::Connection(self.watchdog.state()));
            self.emit(RenderEvent::Notice(Notice::ChannelClosed { reason }));
            drop(channel);

            if !self.reconnect_delay.is_zero() {
                tokio::time::sleep(self.reconnect_delay).await;
            }
        }
    }

    fn handle_open(&mut self) {
        self.watchdog.on_open(Instant::now());
        tracing::info!(endpoint = %self.endpoint, "channel open");
        self.emit(RenderEvent::Connection(self.watchdog.state()));
    }

    fn handle_message(&mut self, raw: String) {
        let before = self.watchdog.state();
        match self.watchdog.on_message(&raw, Instant::now()) {
            Ok(Delivery { snapshot, signal }) => {
                self.last_rejected = None;
                if self.watchdog.state() != before {
                    self.emit(RenderEvent::Connection(self.watchdog.state()));
                }
                if signal == Some(WatchdogSignal::ConnectionRestored) {
                    tracing::info!("telemetry restored");
                    self.emit(RenderEvent::Notice(Notice::ConnectionRestored));
                }

                let snapshot = Arc::new(snapshot);
                self.toggles.on_snapshot(&snapshot);
                self.emit(RenderEvent::Snapshot(snapshot));
                self.emit(RenderEvent::Controls(self.toggles.states()));
            }
            Err(err) => {
                // Repeats of the frame just rejected stay silent
                if self.last_rejected.as_deref() == Some(raw.as_str()) {
                    tracing::debug!(error = %err, "repeated malformed frame");
                    return;
                }
                tracing::warn!(error = %err, "discarding malformed frame");
                self.last_rejected = Some(raw);
                self.emit(RenderEvent::Notice(Notice::DecodeFailed(err.to_string())));
            }
        }
    }

    fn handle_silence(&mut self) {
        if let Some(WatchdogSignal::ConnectionLost) = self.watchdog.on_silence(Instant::now()) {
            tracing::warn!("no telemetry within silence window");
            self.emit(RenderEvent::Connection(self.watchdog.state()));
            self.emit(RenderEvent::Notice(Notice::ConnectionLost));
        }
    }

    fn handle_intent(&mut self, intent: UserIntent) {
        match intent {
            UserIntent::Toggle(id) => match self.toggles.on_user_toggle(id) {
                Ok(command) => {
                    self.emit(RenderEvent::Controls(self.toggles.states()));
                    self.dispatch(command);
                }
                Err(err) => {
                    tracing::info!(control = %id, error = %err, "toggle rejected");
                    let notice = match err {
                        ToggleError::ControlDisabled(id) => Notice::ControlDisabled(id),
                        ToggleError::UnknownControl(id) => Notice::UnknownControl(id),
                    };
                    self.emit(RenderEvent::Notice(notice));
                }
            },
            UserIntent::Setpoint(kind, value) => match Command::setpoint(kind, value) {
                Ok(command) => self.dispatch(command),
                Err(err) => {
                    tracing::info!(error = %err, "setpoint rejected");
                    self.emit(RenderEvent::Notice(Notice::InvalidSetpoint(err.to_string())));
                }
            },
        }
    }

    /// Fire and forget. Failures come back as notices; they never touch control state.
    fn dispatch(&self, command: Command) {
        let gateway = self.gateway.clone();
        let failures = self.failures_tx.clone();
        tokio::spawn(async move {
            match gateway.send(&command).await {
                Ok(()) => tracing::debug!(%command, "command delivered"),
                Err(err) => {
                    tracing::warn!(%command, error = %err, "command failed");
                    let _ = failures.send(Notice::CommandFailed {
                        command: command.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        });
    }

    fn emit(&self, event: RenderEvent) {
        if self.render.send(event).is_err() {
            tracing::debug!("renderer gone, dropping event");
        }
    }
}

async fn silence(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
