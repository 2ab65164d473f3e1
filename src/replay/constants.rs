pub const FRAME_DELAY_MS: u64 = 50;
pub const FRAMES_PAGE_LIMIT: usize = 100;
pub const ENGINE_POLL_MS: u64 = 100;
pub const FRAME_CHANNEL_CAPACITY: usize = 256;
pub const HOST_CHANNEL_CAPACITY: usize = 64;
pub const UNKNOWN_STATUS: &str = "unknown";
pub const STOPPED_STATUS: &str = "stopped";
