//! Triggered effect dispatch for play events.

mod dispatcher;

pub use dispatcher::{dispatch_play_event, DispatchOutcome, DrawShortfall, PlayEvent};
