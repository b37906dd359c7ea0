//! Tessellate - policy core of a tiling window manager.
//!
//! Log verbosity comes from `TESSELLATE_LOG`, then `RUST_LOG`, and defaults
//! to `info`. Logs go to stderr so command output on stdout stays parseable.

use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(err) = tessellate_lib::cli::run() {
        eprintln!("tessellate: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = std::env::var("TESSELLATE_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
