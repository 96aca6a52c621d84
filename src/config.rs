use std::path::{Path, PathBuf};

use url::Url;

use crate::cli::{OptMode, Options};
use crate::linking::{EsFeatures, ModuleKind, Semantics};

/// Linker settings derived from [`Options`]. Never changes once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub semantics: Semantics,
    pub module_kind: ModuleKind,
    pub es_features: EsFeatures,
    pub optimizer: bool,
    pub pretty_print: bool,
    pub source_map: bool,
    pub relativize_source_map_base: Option<Url>,
    pub check_ir: bool,
    pub closure_compiler: bool,
    pub parallel: bool,
    pub batch_mode: bool,
}

/// Classpath entries in resolution order, standard library first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classpath(Vec<PathBuf>);

impl Classpath {
    pub fn new(entries: Vec<PathBuf>) -> Self {
        Classpath(entries)
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }
}

pub fn build(options: &Options) -> (LinkConfig, Classpath) {
    let classpath = options
        .stdlib
        .iter()
        .chain(options.classpath.iter())
        .cloned()
        .collect();

    let full_opt = options.mode == OptMode::FullOpt;

    let semantics = if full_opt {
        options.semantics.optimized()
    } else {
        options.semantics
    };

    let config = LinkConfig {
        semantics,
        module_kind: options.module_kind,
        es_features: options.es_features,
        optimizer: options.mode != OptMode::NoOpt,
        pretty_print: options.pretty_print,
        source_map: options.source_map,
        relativize_source_map_base: options.relativize_source_map.clone(),
        check_ir: options.check_ir,
        closure_compiler: full_opt,
        parallel: true,
        batch_mode: true,
    };

    (config, Classpath::new(classpath))
}
