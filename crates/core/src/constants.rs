//! Shared constants for the runtime

use std::time::Duration;

/// Bound on a fetch when the source does not specify one
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of each runner's conduit. One slot mirrors an unbuffered
/// hand-off: a runner can be at most one update ahead of the multiplexer.
pub const CONDUIT_CAPACITY: usize = 1;

/// Header object written once at the start of the stream
pub const PROTOCOL_HEADER: &str = r#"{"version":1}"#;
