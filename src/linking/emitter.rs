use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::panic;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, dispatcher, info, warn, Dispatch};

use super::errors::{LinkError, LinkResult};
use super::{Linker, ModuleInitializer, ModuleKind, OutputSink};
use crate::config::LinkConfig;
use crate::ir::{open_archive, IrFile, IrHeader, IR_VERSION_MAJOR, IR_VERSION_MINOR};

/// Class that every program needs, supplied by the standard library.
pub const OBJECT_CLASS: &str = "java.lang.Object";

#[derive(Debug, Clone)]
struct ClassInfo {
    name: String,
    file: IrFile,
}

/// Backend that checks the IR it is given and writes a launcher for the
/// requested module initializers.
pub struct StandardLinker {
    config: LinkConfig,
}

impl StandardLinker {
    pub fn new(config: LinkConfig) -> Self {
        StandardLinker { config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    async fn load_infos(&self, ir_files: Vec<IrFile>, logger: &Dispatch) -> LinkResult<Vec<ClassInfo>> {
        let batches = batch_by_archive(ir_files);

        let per_batch: Vec<Vec<ClassInfo>> = if self.config.parallel {
            let tasks = batches.into_iter().map(|batch| {
                let logger = logger.clone();
                join_task(tokio::task::spawn_blocking(move || {
                    dispatcher::with_default(&logger, || load_batch(batch))
                }))
            });

            try_join_all(tasks).await?
        } else {
            let logger = logger.clone();
            join_task(tokio::task::spawn_blocking(move || {
                dispatcher::with_default(&logger, || {
                    batches.into_iter().map(load_batch).collect()
                })
            }))
            .await?
        };

        Ok(per_batch.into_iter().flatten().collect())
    }

    fn index_classes(&self, infos: Vec<ClassInfo>) -> LinkResult<BTreeMap<String, ClassInfo>> {
        let mut classes = BTreeMap::new();

        for info in infos {
            match classes.entry(info.name.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(info);
                }
                Entry::Occupied(entry) => {
                    let first: &ClassInfo = entry.get();

                    if self.config.check_ir {
                        return Err(LinkError::DuplicateClass {
                            name: info.name,
                            file: info.file.to_string(),
                            first_file: first.file.to_string(),
                        });
                    }

                    warn!(
                        "Ignoring duplicate definition of {} in {}, first defined in {}",
                        info.name, info.file, first.file
                    );
                }
            }
        }

        if !classes.contains_key(OBJECT_CLASS) {
            return Err(LinkError::MissingCoreClass(String::from(OBJECT_CLASS)));
        }

        Ok(classes)
    }

    fn emit(
        &self,
        classes: &BTreeMap<String, ClassInfo>,
        module_initializers: &[ModuleInitializer],
    ) -> LinkResult<String> {
        let es2015 = self.config.es_features.use_ecmascript_2015();
        let decl = if es2015 { "const" } else { "var" };
        let minify = self.config.closure_compiler && !self.config.pretty_print;
        let mut printer = Printer::new(minify);

        let module_wrapper = self.config.module_kind == ModuleKind::NoModule;

        if module_wrapper {
            printer.line("(function(){");
            printer.indent();
        }

        printer.line("'use strict';");

        let semantics = &self.config.semantics;
        let linking_info = json!({
            "esVersion": if es2015 { 6 } else { 5 },
            "assumingES6": es2015,
            "productionMode": semantics.production_mode,
            "asInstanceOfs": format!("{:?}", semantics.as_instance_ofs),
            "arrayIndexOutOfBounds": format!("{:?}", semantics.array_index_out_of_bounds),
            "moduleInit": format!("{:?}", semantics.module_init),
            "linkerVersion": crate::VERSION,
        });
        printer.line(&format!(
            "{} $linkingInfo = Object.freeze({});",
            decl, linking_info
        ));

        let class_names: Vec<&String> = classes.keys().collect();
        printer.line(&format!(
            "{} $classes = {};",
            decl,
            serde_json::to_string(&class_names)?
        ));

        for init in module_initializers {
            printer.line(&format!(
                "$s_{}__{}__AT__V({});",
                encode_class_name(init.owner()),
                init.method(),
                serde_json::to_string(init.args())?
            ));
        }

        match self.config.module_kind {
            ModuleKind::NoModule => {
                printer.dedent();
                printer.line("}).call(this);");
            }
            ModuleKind::CommonJSModule => printer.line("exports.$classes = $classes;"),
            ModuleKind::ESModule => printer.line("export { $classes };"),
        }

        Ok(printer.finish())
    }

    fn source_map(
        &self,
        classes: &BTreeMap<String, ClassInfo>,
        output: &OutputSink,
    ) -> LinkResult<Vec<u8>> {
        let sources = classes
            .values()
            .map(|info| match info.file.uri() {
                Some(uri) => self
                    .config
                    .relativize_source_map_base
                    .as_ref()
                    .and_then(|base| base.make_relative(&uri))
                    .unwrap_or_else(|| uri.to_string()),
                None => info.file.to_string(),
            })
            .collect();

        let map = SourceMap {
            version: 3,
            file: output.file_name(),
            sources,
            names: Vec::new(),
            mappings: "",
        };

        if self.config.pretty_print {
            Ok(serde_json::to_vec_pretty(&map)?)
        } else {
            Ok(serde_json::to_vec(&map)?)
        }
    }
}

#[async_trait]
impl Linker for StandardLinker {
    async fn link(
        &self,
        ir_files: Vec<IrFile>,
        module_initializers: &[ModuleInitializer],
        output: &OutputSink,
        logger: &Dispatch,
    ) -> LinkResult<()> {
        let start = Instant::now();

        info!(
            "Linking {} IR files into {}",
            ir_files.len(),
            output.path().display()
        );
        debug!(
            "Optimizer {}, module kind {}, {:?}",
            if self.config.optimizer { "enabled" } else { "disabled" },
            self.config.module_kind,
            self.config.es_features
        );

        let infos = self.load_infos(ir_files, logger).await?;
        debug!("Linker: Read info: {}ms", start.elapsed().as_millis());

        let classes = self.index_classes(infos)?;

        for init in module_initializers {
            let module_class = format!("{}$", init.owner());

            if !classes.contains_key(init.owner()) && !classes.contains_key(&module_class) {
                return Err(LinkError::UnresolvedModuleInitializer {
                    owner: init.owner().to_owned(),
                    method: init.method().to_owned(),
                });
            }
        }

        let emit_start = Instant::now();
        let mut js = self.emit(&classes, module_initializers)?;
        debug!("Emitter: {}ms", emit_start.elapsed().as_millis());

        if self.config.source_map {
            let map_path = output.source_map_path();
            let map = self.source_map(&classes, output)?;
            let map_name = map_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            js.push_str(&format!("\n//# sourceMappingURL={}\n", map_name));

            output.write_all(&[
                (output.path().to_path_buf(), js.as_bytes()),
                (map_path, map.as_slice()),
            ])?;
        } else {
            output.write_all(&[(output.path().to_path_buf(), js.as_bytes())])?;
        }

        info!(
            "Linked {} classes with {} module initializers in {}ms",
            classes.len(),
            module_initializers.len(),
            start.elapsed().as_millis()
        );

        Ok(())
    }
}

/// Groups consecutive entries of the same archive so each archive is opened
/// once. Plain files get a batch of their own.
fn batch_by_archive(files: Vec<IrFile>) -> Vec<Vec<IrFile>> {
    let mut batches: Vec<Vec<IrFile>> = Vec::new();

    for file in files {
        let same_archive = file.archive().is_some()
            && batches
                .last()
                .and_then(|batch| batch.first())
                .and_then(IrFile::archive)
                == file.archive();

        match batches.last_mut() {
            Some(batch) if same_archive => batch.push(file),
            _ => batches.push(vec![file]),
        }
    }

    batches
}

fn load_batch(batch: Vec<IrFile>) -> LinkResult<Vec<ClassInfo>> {
    let mut archive = match batch.first().and_then(IrFile::archive) {
        Some(path) => Some(open_archive(path).map_err(|source| LinkError::IoError {
            path: path.to_path_buf(),
            source,
        })?),
        None => None,
    };

    batch
        .into_iter()
        .map(|file| {
            let bytes = match archive.as_mut() {
                Some(archive) => file.read_from(archive),
                None => file.read(),
            }
            .map_err(|source| LinkError::UnreadableIrFile {
                file: file.to_string(),
                source,
            })?;

            load_info(file, &bytes)
        })
        .collect()
}

fn load_info(file: IrFile, bytes: &[u8]) -> LinkResult<ClassInfo> {
    let header = IrHeader::parse(bytes).map_err(|e| LinkError::InvalidIrFile {
        file: file.to_string(),
        reason: e.to_string(),
    })?;

    if !header.is_supported() {
        return Err(LinkError::IrVersionMismatch {
            file: file.to_string(),
            found: header.version().to_owned(),
            supported: format!("{}.{}", IR_VERSION_MAJOR, IR_VERSION_MINOR),
        });
    }

    debug!("Read {} (IR {})", file, header.version());

    Ok(ClassInfo {
        name: file.class_name(),
        file,
    })
}

async fn join_task<T>(handle: JoinHandle<LinkResult<T>>) -> LinkResult<T> {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => panic::resume_unwind(e.into_panic()),
        Err(e) => Err(LinkError::Interrupted(e.to_string())),
    }
}

fn encode_class_name(name: &str) -> String {
    format!("L{}", name.replace('_', "$und").replace('.', "_"))
}

#[derive(Serialize)]
struct SourceMap<'a> {
    version: u32,
    file: String,
    sources: Vec<String>,
    names: Vec<String>,
    mappings: &'a str,
}

struct Printer {
    out: String,
    indent: usize,
    minify: bool,
}

impl Printer {
    fn new(minify: bool) -> Self {
        Printer {
            out: String::with_capacity(1024),
            indent: 0,
            minify,
        }
    }

    fn line(&mut self, text: &str) {
        if self.minify {
            self.out.push_str(text);
        } else {
            for _ in 0..self.indent {
                self.out.push_str("  ");
            }
            self.out.push_str(text);
            self.out.push('\n');
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    fn finish(self) -> String {
        self.out
    }
}
