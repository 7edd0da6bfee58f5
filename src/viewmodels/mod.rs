pub mod tracker_viewmodel;

#[cfg(test)]
pub(crate) mod fakes;

pub use tracker_viewmodel::{LocationTracker, PollOutcome, TrackerError};
