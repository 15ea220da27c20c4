use common::AggregateView;

/// One element of a live-feed subscription.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    /// Start-of-stream marker carrying the push interval, so the client can
    /// configure its reconnect retry.
    Open { retry_millis: u64 },

    /// A fresh aggregate view, pushed once per interval whether or not the
    /// underlying data changed.
    Update(AggregateView),
}
