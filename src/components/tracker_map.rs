use yew::prelude::*;

use crate::hooks::use_location_tracker;

/// Contenedor del mapa; el tracker se engancha a su ciclo de vida
#[function_component(TrackerMap)]
pub fn tracker_map() -> Html {
    let tracker = use_location_tracker();
    let snapshot = *tracker.snapshot;

    html! {
        <div
            id={tracker.container_id.clone()}
            class="tracker-map"
            data-phase={snapshot.phase.as_str()}
            data-points={snapshot.point_count.to_string()}
            style="height: 100vh; width: 100%;"
        ></div>
    }
}
