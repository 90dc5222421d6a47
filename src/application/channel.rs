// Push channel port
use tokio::sync::mpsc;
use url::Url;

/// Lifecycle of one duplex channel, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Message(String),
    /// Terminal. Carries the close reason or transport error, if any.
    Closed(Option<String>),
}

pub trait ChannelConnector: Send + Sync {
    /// Open one channel to `endpoint`. Dropping the receiver abandons it.
    fn connect(&self, endpoint: &Url) -> mpsc::Receiver<ChannelEvent>;
}
