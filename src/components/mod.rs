pub mod app;
pub mod home_page;
pub mod tracker_map;

pub use app::App;
pub use home_page::HomePage;
pub use tracker_map::TrackerMap;
