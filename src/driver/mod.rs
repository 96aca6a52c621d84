use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::instrument::WithSubscriber;
use tracing::{debug, Dispatch};

use crate::config::Classpath;
use crate::ir::{IrContainer, IrFile};
use crate::linking::{Linker, ModuleInitializer, OutputSink};

pub mod errors;
pub mod reader;

pub use errors::{DriverError, InputResolutionError, ResolveResult};
pub use reader::FileSystemContainers;

/// Finds IR on the classpath.
#[async_trait]
pub trait IrContainerSource: Send + Sync {
    async fn discover(&self, classpath: &Classpath) -> ResolveResult<Vec<IrContainer>>;

    async fn enumerate(&self, container: &IrContainer) -> ResolveResult<Vec<IrFile>>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    ResolvingInputs,
    Linking,
    Done,
    Failed,
}

/// Runs one link: resolve the classpath, collect the IR files, hand them to
/// the linker and wait for it to finish.
pub struct LinkOrchestrator<S, L> {
    source: S,
    linker: L,
    logger: Dispatch,
    state: LinkState,
}

impl<S, L> LinkOrchestrator<S, L>
where
    S: IrContainerSource,
    L: Linker,
{
    pub fn new(source: S, linker: L, logger: Dispatch) -> Self {
        LinkOrchestrator {
            source,
            linker,
            logger,
            state: LinkState::Idle,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn linker(&self) -> &L {
        &self.linker
    }

    /// Blocks the calling thread until linking finishes. There is no timeout.
    pub fn run_blocking(
        &mut self,
        classpath: &Classpath,
        module_initializers: &[ModuleInitializer],
        output: &OutputSink,
    ) -> Result<(), DriverError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(DriverError::Runtime)?;

        runtime.block_on(self.link(classpath, module_initializers, output))
    }

    pub async fn link(
        &mut self,
        classpath: &Classpath,
        module_initializers: &[ModuleInitializer],
        output: &OutputSink,
    ) -> Result<(), DriverError> {
        if self.state != LinkState::Idle {
            return Err(DriverError::AlreadyStarted(self.state));
        }

        let logger = self.logger.clone();

        let result = self
            .drive(classpath, module_initializers, output)
            .with_subscriber(logger)
            .await;

        match result {
            Ok(()) => self.transition(LinkState::Done),
            Err(_) => self.transition(LinkState::Failed),
        }

        result
    }

    async fn drive(
        &mut self,
        classpath: &Classpath,
        module_initializers: &[ModuleInitializer],
        output: &OutputSink,
    ) -> Result<(), DriverError> {
        self.transition(LinkState::ResolvingInputs);
        let ir_files = self.resolve_inputs(classpath).await?;

        self.transition(LinkState::Linking);
        self.linker
            .link(ir_files, module_initializers, output, &self.logger)
            .await?;

        Ok(())
    }

    async fn resolve_inputs(&self, classpath: &Classpath) -> ResolveResult<Vec<IrFile>> {
        let containers = self.source.discover(classpath).await?;

        let per_container =
            try_join_all(containers.iter().map(|c| self.source.enumerate(c))).await?;

        let ir_files: Vec<IrFile> = per_container.into_iter().flatten().collect();

        debug!(
            "Resolved {} IR files from {} containers",
            ir_files.len(),
            containers.len()
        );

        Ok(ir_files)
    }

    fn transition(&mut self, next: LinkState) {
        let _guard = tracing::dispatcher::set_default(&self.logger);
        debug!("Link state {:?} -> {:?}", self.state, next);

        self.state = next;
    }
}
