// AI features built on the streaming client: the SSE relay used by the
// chat and pipeline screens, and resume upload analysis.

pub mod extract;
pub mod handlers;
pub mod store;
pub mod targets;
