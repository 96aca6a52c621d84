//! Every flag `scalajsld` understands, as data.
//!
//! Each entry knows its names, how many values it takes, how those values are
//! validated and how it changes [`Options`]. The table is compiled into a clap
//! command by [`super::command`].

use std::path::PathBuf;

use clap::builder::ValueParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches};
use thiserror::Error;
use url::Url;

use super::options::{LogLevel, OptMode, Options};
use crate::linking::{CheckedBehavior, EsFeatures, ModuleInitializer, ModuleKind};

pub const CLASSPATH: &str = "classpath";
pub const MAIN_METHOD: &str = "mainMethod";
pub const OUTPUT: &str = "output";
pub const FAST_OPT: &str = "fastOpt";
pub const NO_OPT: &str = "noOpt";
pub const FULL_OPT: &str = "fullOpt";
pub const PRETTY_PRINT: &str = "prettyPrint";
pub const SOURCE_MAP: &str = "sourceMap";
pub const COMPLIANT_AS_INSTANCE_OFS: &str = "compliantAsInstanceOfs";
pub const ES2015: &str = "es2015";
pub const MODULE_KIND: &str = "moduleKind";
pub const CHECK_IR: &str = "checkIR";
pub const RELATIVIZE_SOURCE_MAP: &str = "relativizeSourceMap";
pub const NO_STDLIB: &str = "noStdlib";
pub const STDLIB: &str = "stdlib";
pub const DEBUG: &str = "debug";
pub const QUIET: &str = "quiet";
pub const REALLY_QUIET: &str = "reallyQuiet";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot turn '{0}' into a directory URI")]
pub struct DirectoryUriError(String);

pub enum Arity {
    Switch,
    Value {
        value_name: &'static str,
        parser: fn() -> ValueParser,
    },
    Repeated {
        value_name: &'static str,
        parser: fn() -> ValueParser,
    },
    Positional {
        value_name: &'static str,
        parser: fn() -> ValueParser,
    },
}

pub struct Flag {
    pub id: &'static str,
    pub short: Option<char>,
    pub long: Option<&'static str>,
    /// Multi-character short name such as `-mm`, rewritten to the long form
    /// before clap sees it.
    pub legacy_short: Option<&'static str>,
    pub arity: Arity,
    pub help: &'static str,
    pub required: bool,
    pub hidden: bool,
    pub overrides: &'static [&'static str],
    pub apply: fn(&mut Options, &ArgMatches),
}

impl Flag {
    const fn new(
        id: &'static str,
        short: Option<char>,
        long: Option<&'static str>,
        arity: Arity,
        help: &'static str,
        apply: fn(&mut Options, &ArgMatches),
    ) -> Self {
        Flag {
            id,
            short,
            long,
            legacy_short: None,
            arity,
            help,
            required: false,
            hidden: false,
            overrides: &[],
            apply,
        }
    }

    const fn switch(
        id: &'static str,
        short: Option<char>,
        long: &'static str,
        help: &'static str,
        apply: fn(&mut Options, &ArgMatches),
    ) -> Self {
        Flag::new(id, short, Some(long), Arity::Switch, help, apply)
    }

    const fn value(
        id: &'static str,
        short: Option<char>,
        long: &'static str,
        value_name: &'static str,
        parser: fn() -> ValueParser,
        help: &'static str,
        apply: fn(&mut Options, &ArgMatches),
    ) -> Self {
        Flag::new(
            id,
            short,
            Some(long),
            Arity::Value { value_name, parser },
            help,
            apply,
        )
    }

    const fn required(self) -> Self {
        Flag {
            required: true,
            ..self
        }
    }

    const fn hidden(self) -> Self {
        Flag {
            hidden: true,
            ..self
        }
    }

    const fn overrides(self, overrides: &'static [&'static str]) -> Self {
        Flag { overrides, ..self }
    }

    const fn legacy_short(self, legacy_short: &'static str) -> Self {
        Flag {
            legacy_short: Some(legacy_short),
            ..self
        }
    }

    pub fn arg(&self) -> Arg {
        let mut arg = Arg::new(self.id)
            .help(self.help)
            .required(self.required)
            .hide(self.hidden);

        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(long) = self.long {
            arg = arg.long(long);
        }
        if !self.overrides.is_empty() {
            arg = arg.overrides_with_all(self.overrides.iter().copied());
        }

        match &self.arity {
            Arity::Switch => arg.action(ArgAction::SetTrue),
            Arity::Value { value_name, parser } => arg
                .value_name(*value_name)
                .value_parser(parser())
                .action(ArgAction::Set),
            Arity::Repeated { value_name, parser } | Arity::Positional { value_name, parser } => {
                arg.value_name(*value_name)
                    .value_parser(parser())
                    .action(ArgAction::Append)
            }
        }
    }

    /// Whether the flag was given on the command line and survived overrides.
    pub fn is_present(&self, matches: &ArgMatches) -> bool {
        match self.arity {
            Arity::Switch => matches.get_flag(self.id),
            _ => matches.value_source(self.id) == Some(ValueSource::CommandLine),
        }
    }
}

pub static FLAGS: &[Flag] = &[
    Flag::new(
        CLASSPATH,
        None,
        None,
        Arity::Positional {
            value_name: "classpath",
            parser: ValueParser::path_buf,
        },
        "Entries of the classpath: directories, jars or .sjsir files",
        apply_classpath,
    ),
    Flag::new(
        MAIN_METHOD,
        None,
        Some("mainMethod"),
        Arity::Repeated {
            value_name: "full.name.Object.main",
            parser: main_method_parser,
        },
        "Main method to call when the output is loaded, may be repeated",
        apply_main_method,
    )
    .legacy_short("-mm"),
    Flag::value(
        OUTPUT,
        Some('o'),
        "output",
        "file",
        ValueParser::path_buf,
        "Output file of the linker",
        apply_output,
    )
    .required(),
    Flag::switch(
        FAST_OPT,
        Some('f'),
        "fastOpt",
        "Optimize code (this is the default)",
        |options, _| options.mode = OptMode::FastOpt,
    )
    .overrides(&[NO_OPT, FULL_OPT]),
    Flag::switch(
        NO_OPT,
        Some('n'),
        "noOpt",
        "Don't optimize code",
        |options, _| options.mode = OptMode::NoOpt,
    )
    .overrides(&[FAST_OPT, FULL_OPT]),
    Flag::switch(
        FULL_OPT,
        Some('u'),
        "fullOpt",
        "Fully optimize code and minify the output",
        |options, _| options.mode = OptMode::FullOpt,
    )
    .overrides(&[FAST_OPT, NO_OPT]),
    Flag::switch(
        PRETTY_PRINT,
        Some('p'),
        "prettyPrint",
        "Pretty print full opted code (meaningful with -u)",
        |options, _| options.pretty_print = true,
    ),
    Flag::switch(
        SOURCE_MAP,
        Some('s'),
        "sourceMap",
        "Produce a source map for the produced code",
        |options, _| options.source_map = true,
    ),
    Flag::switch(
        COMPLIANT_AS_INSTANCE_OFS,
        None,
        "compliantAsInstanceOfs",
        "Use compliant asInstanceOfs",
        |options, _| {
            options.semantics = options
                .semantics
                .with_as_instance_ofs(CheckedBehavior::Compliant)
        },
    ),
    Flag::switch(
        ES2015,
        None,
        "es2015",
        "Use ECMAScript 2015",
        |options, _| options.es_features = EsFeatures::Es2015,
    ),
    Flag::value(
        MODULE_KIND,
        Some('k'),
        "moduleKind",
        "kind",
        module_kind_parser,
        "Module kind of the output: NoModule, ESModule or CommonJSModule",
        apply_module_kind,
    ),
    Flag::switch(
        CHECK_IR,
        Some('c'),
        "checkIR",
        "Check IR before optimizing",
        |options, _| options.check_ir = true,
    ),
    Flag::value(
        RELATIVIZE_SOURCE_MAP,
        Some('r'),
        "relativizeSourceMap",
        "path",
        directory_uri_parser,
        "Relativize source map with respect to given path (meaningful with -s)",
        apply_relativize_source_map,
    ),
    Flag::switch(
        NO_STDLIB,
        None,
        "noStdlib",
        "Don't automatically include the standard library",
        |options, _| options.stdlib = None,
    )
    .overrides(&[STDLIB]),
    Flag::value(
        STDLIB,
        None,
        "stdlib",
        "path",
        ValueParser::path_buf,
        "Location of the standard library, set by the wrapper script",
        apply_stdlib,
    )
    .overrides(&[NO_STDLIB])
    .hidden(),
    Flag::switch(
        DEBUG,
        Some('d'),
        "debug",
        "Debug mode: show full log",
        |options, _| options.log_level = LogLevel::Debug,
    )
    .overrides(&[QUIET, REALLY_QUIET]),
    Flag::switch(
        QUIET,
        Some('q'),
        "quiet",
        "Only show warnings and errors",
        |options, _| options.log_level = LogLevel::Warn,
    )
    .overrides(&[DEBUG, REALLY_QUIET]),
    Flag::switch(
        REALLY_QUIET,
        None,
        "really-quiet",
        "Only show errors",
        |options, _| options.log_level = LogLevel::Error,
    )
    .overrides(&[DEBUG, QUIET])
    .legacy_short("-qq"),
];

fn main_method_parser() -> ValueParser {
    ValueParser::new(ModuleInitializer::parse)
}

fn module_kind_parser() -> ValueParser {
    ValueParser::new(ModuleKind::parse)
}

fn directory_uri_parser() -> ValueParser {
    ValueParser::new(parse_directory_uri)
}

pub fn parse_directory_uri(value: &str) -> Result<Url, DirectoryUriError> {
    std::path::absolute(value)
        .ok()
        .and_then(|path| Url::from_directory_path(path).ok())
        .ok_or_else(|| DirectoryUriError(value.to_owned()))
}

fn apply_classpath(options: &mut Options, matches: &ArgMatches) {
    if let Some(entries) = matches.get_many::<PathBuf>(CLASSPATH) {
        options.classpath.extend(entries.cloned());
    }
}

fn apply_main_method(options: &mut Options, matches: &ArgMatches) {
    if let Some(inits) = matches.get_many::<ModuleInitializer>(MAIN_METHOD) {
        options.module_initializers.extend(inits.cloned());
    }
}

fn apply_output(options: &mut Options, matches: &ArgMatches) {
    if let Some(path) = matches.get_one::<PathBuf>(OUTPUT) {
        options.output = path.clone();
    }
}

fn apply_module_kind(options: &mut Options, matches: &ArgMatches) {
    if let Some(kind) = matches.get_one::<ModuleKind>(MODULE_KIND) {
        options.module_kind = *kind;
    }
}

fn apply_relativize_source_map(options: &mut Options, matches: &ArgMatches) {
    options.relativize_source_map = matches.get_one::<Url>(RELATIVIZE_SOURCE_MAP).cloned();
}

fn apply_stdlib(options: &mut Options, matches: &ArgMatches) {
    options.stdlib = matches.get_one::<PathBuf>(STDLIB).cloned();
}
