use serde::{Deserialize, Serialize};

/// The three Device Portal calls a session issues. At most one of each is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Auth,
    Start,
    Stop,
}

impl RequestKind {
    /// Order in which resolved requests are processed within one poll.
    pub const POLL_ORDER: [RequestKind; 3] =
        [RequestKind::Auth, RequestKind::Start, RequestKind::Stop];

    pub fn label(self) -> &'static str {
        match self {
            RequestKind::Auth => "auth",
            RequestKind::Start => "start",
            RequestKind::Stop => "stop",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
