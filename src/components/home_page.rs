use gloo_timers::future::TimeoutFuture;
use yew::prelude::*;
use yew::suspense::use_future;

use crate::config::CONFIG;
use super::TrackerMap;

/// Página principal: barra de título + contenido con scroll + mapa diferido
#[function_component(HomePage)]
pub fn home_page() -> Html {
    let title = CONFIG.page_title.clone();
    let fallback = html! { <div class="map-loading"></div> };

    html! {
        <div class="page">
            <header class="app-header">
                <div class="toolbar">
                    <h1 class="title">{ title.clone() }</h1>
                </div>
            </header>
            <main class="content content-fullscreen">
                <header class="app-header header-condense">
                    <div class="toolbar">
                        <h1 class="title title-large">{ title }</h1>
                    </div>
                </header>
                <Suspense {fallback}>
                    <DeferredTrackerMap />
                </Suspense>
            </main>
        </div>
    }
}

/// Suspende hasta después del primer render de la página
#[function_component(DeferredTrackerMap)]
fn deferred_tracker_map() -> HtmlResult {
    use_future(|| async {
        TimeoutFuture::new(0).await;
    })?;

    Ok(html! { <TrackerMap /> })
}
