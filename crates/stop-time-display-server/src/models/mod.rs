pub mod status;

pub use status::{
    PollResponse, SessionMetadata, StopTimeEstimate, StopReason, NO_AUTHORITY_MESSAGE,
    STOP_TIME_DISPLAY_KEY,
};
