use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use url::Url;

use crate::linking::{EsFeatures, ModuleInitializer, ModuleKind, Semantics};

/// The three optimisation flags collapse into one mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum OptMode {
    NoOpt,
    #[default]
    FastOpt,
    FullOpt,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Everything the command line asked for, before any linking happens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Options {
    pub classpath: Vec<PathBuf>,
    pub module_initializers: Vec<ModuleInitializer>,
    pub output: PathBuf,
    pub semantics: Semantics,
    pub es_features: EsFeatures,
    pub module_kind: ModuleKind,
    pub mode: OptMode,
    pub pretty_print: bool,
    pub source_map: bool,
    pub relativize_source_map: Option<Url>,
    pub check_ir: bool,
    pub stdlib: Option<PathBuf>,
    pub log_level: LogLevel,
}
