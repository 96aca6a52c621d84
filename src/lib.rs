use tracing::Dispatch;

pub mod cli;
pub mod config;
pub mod driver;
pub mod ir;
pub mod linking;
pub mod logging;

pub use cli::{parse_args, Options};
pub use config::{Classpath, LinkConfig};
pub use driver::{DriverError, FileSystemContainers, LinkOrchestrator, LinkState};
pub use linking::{OutputSink, StandardLinker};

pub static VERSION: &str = env!("CARGO_PKG_VERSION");

/// Links everything `options` describes, blocking until the output is written.
pub fn run(options: &Options, logger: Dispatch) -> Result<(), DriverError> {
    let (config, classpath) = config::build(options);

    if classpath.is_empty() {
        tracing::dispatcher::with_default(&logger, || {
            tracing::warn!("The classpath is empty, nothing to link")
        });
    }

    let output = OutputSink::new(&options.output);
    let linker = StandardLinker::new(config);
    let mut orchestrator = LinkOrchestrator::new(FileSystemContainers::new(), linker, logger);

    orchestrator.run_blocking(&classpath, &options.module_initializers, &output)
}
