// Event types for async communication

/// Results of background work that is not owned by the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The text-to-video service returned a URL
    VideoReady(String),
    /// The text-to-video request failed
    VideoFailed(String),
}
