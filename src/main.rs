use location_trail::components::App;
use location_trail::config::CONFIG;

fn main() {
    // Panics legibles en la consola del navegador
    console_error_panic_hook::set_once();

    if CONFIG.is_logging_enabled() {
        wasm_logger::init(wasm_logger::Config::default());
    }
    log::info!("🚀 Location Trail starting...");

    yew::Renderer::<App>::new().render();
}
