use std::sync::Once;

static INIT: Once = Once::new();

/// Loads `logging_config.yaml` once per test binary. Tests run in parallel
/// and the global logger can only be set once.
pub fn init_default_logging() {
    INIT.call_once(|| {
        if let Err(e) =
            log4rs::init_file("logging_config.yaml", Default::default())
        {
            eprintln!("Failed to initialize logging: {e}");
        }
    });
}
