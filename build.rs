use std::env;
use std::fs;
use std::path::Path;

// Claves que `AppConfig::from_env` lee con option_env!
const CONFIG_KEYS: &[&str] = &[
    "PAGE_TITLE",
    "ENABLE_LOGGING",
    "MAP_CONTAINER_ID",
    "MAX_TRACK_POINTS",
    "INVALIDATE_SIZE_DELAY_MS",
    "INITIAL_ZOOM",
    "MIN_ZOOM",
    "MAX_BOUNDS_VISCOSITY",
    "TILE_URL",
    "TILE_ATTRIBUTION",
    "TILE_NO_WRAP",
    "TRACK_COLOR",
    "TRACK_WEIGHT",
];

fn main() {
    let env_file = Path::new(".env");

    if env_file.exists() {
        println!("cargo:rerun-if-changed=.env");

        if let Ok(contents) = fs::read_to_string(env_file) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                // KEY=VALUE
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim();

                    if !CONFIG_KEYS.contains(&key) {
                        println!("cargo:warning=Clave desconocida en .env: {}", key);
                        continue;
                    }

                    // El entorno del proceso tiene prioridad sobre .env
                    if env::var(key).is_err() {
                        println!("cargo:rustc-env={}={}", key, value);
                    }
                }
            }
        }
    }

    for key in CONFIG_KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
