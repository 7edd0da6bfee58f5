// ============================================================================
// USE LOCATION TRACKER HOOK - Ciclo de vida del tracker
// ============================================================================
// Monta el tracker al montar el componente y lo desmonta en el cleanup.
// La lógica vive en el ViewModel.
// ============================================================================

use yew::prelude::*;

use crate::config::CONFIG;
use crate::maps::LeafletMapFactory;
use crate::services::{BrowserScheduler, PlatformGeolocator};
use crate::state::TrackerSnapshot;
use crate::viewmodels::LocationTracker;

pub type WebLocationTracker = LocationTracker<PlatformGeolocator, LeafletMapFactory, BrowserScheduler>;

/// Handle del hook
#[derive(Clone)]
pub struct UseLocationTrackerHandle {
    pub snapshot: UseStateHandle<TrackerSnapshot>,
    pub container_id: AttrValue,
}

#[hook]
pub fn use_location_tracker() -> UseLocationTrackerHandle {
    let snapshot = use_state(TrackerSnapshot::default);

    {
        let snapshot = snapshot.clone();
        // Dependencias vacías: un tracker por montaje
        use_effect_with((), move |_| {
            log::info!("🗺️ Hook: montando tracker de ubicación...");

            let tracker: WebLocationTracker = LocationTracker::new(
                PlatformGeolocator::detect(),
                LeafletMapFactory,
                BrowserScheduler,
                CONFIG.tracker_config.clone(),
                CONFIG.map_config.clone(),
            );
            tracker.subscribe(move |s| snapshot.set(*s));
            tracker.mount();

            move || {
                log::info!("🗺️ Hook: desmontando tracker de ubicación");
                tracker.unmount();
            }
        });
    }

    UseLocationTrackerHandle {
        snapshot,
        container_id: AttrValue::from(CONFIG.map_config.container_id.clone()),
    }
}
