//! Host events delivered to a session

/// Events the host delivers, one at a time, to [`crate::Session::handle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Character entered the world: load state and start waiting for the friends list
    Login,
    /// Character left the world: persist state
    Logout,
    /// The host friends list changed
    FriendListChanged,
    /// Check whether the host friends list has loaded (1-based attempt)
    PollAvailability { attempt: u32 },
    /// Settle delay elapsed; resume change events if still current
    ResumeFriendEvents { generation: u64 },
    /// A slash-style command typed by the player
    Command(String),
}
