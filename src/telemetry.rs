use tracing_subscriber::{fmt, EnvFilter};

/// JSON lines in production, human readable output elsewhere.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_target(false);

    let result = if json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing already initialised: {}", e);
    }
}
