pub mod cull;
pub mod status_poller;

pub use status_poller::StatusPoller;
