pub mod app;
pub mod domain;
pub mod infra;

use tracing::Level;

/// Initialize logging to stderr at a level selected by the `-v` count:
/// warnings by default, `-v` for info, `-vv` for debug.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
