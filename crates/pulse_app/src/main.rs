use pulse_app::app::{run, AppConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    if let Err(err) = AppConfig::from_env().and_then(run) {
        eprintln!("Failed to render Pulse dashboard: {err:#}");
        std::process::exit(1);
    }
}
