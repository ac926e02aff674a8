//! Video panel surface model
//!
//! A panel is the rectangle a camera popup plays video in. Its surface
//! reflects what the attachment layer bound to it.

/// Panel identifier (`camera-video-{id}` for camera popups)
pub type PanelId = String;

/// What a video panel currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelSurface {
    /// Nothing bound; source cleared
    Empty,
    /// An adaptive-stream session is driving the panel
    Session { source: String },
    /// The panel plays the source natively, no session involved
    Native { source: String },
    /// In-place notice (unsupported playback, dead stream)
    Notice(String),
}

impl PanelSurface {
    /// Source URL currently bound to the panel, if any
    pub fn source(&self) -> Option<&str> {
        match self {
            PanelSurface::Session { source } | PanelSurface::Native { source } => Some(source),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.source().is_some()
    }
}
