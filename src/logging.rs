use tracing::Dispatch;

use crate::cli::LogLevel;

/// Builds the logger handed to the linker. Records go to stderr, filtered by
/// the level picked with `-d`, `-q` or `-qq`.
pub fn logger(level: LogLevel) -> Dispatch {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();

    Dispatch::new(subscriber)
}

/// Installs `logger` as the process-wide default and returns it.
pub fn init(level: LogLevel) -> Dispatch {
    let dispatch = logger(level);

    if tracing::dispatcher::set_global_default(dispatch.clone()).is_err() {
        eprintln!("Warning: a global logger was already installed");
    }

    dispatch
}
