pub mod use_location_tracker;

pub use use_location_tracker::{use_location_tracker, UseLocationTrackerHandle, WebLocationTracker};
