use std::path::PathBuf;

use pretty_assertions::assert_eq;
use scalajsld::cli::{parse_args, Options};
use scalajsld::config::{build, Classpath};
use scalajsld::linking::{CheckedBehavior, ModuleKind, Semantics};

fn options(args: &[&str]) -> Options {
    parse_args(std::iter::once("scalajsld").chain(args.iter().copied()))
        .expect("Failed to parse arguments")
}

#[test]
fn stdlib_goes_first() {
    let (_, classpath) = build(&options(&["a.jar", "b", "-o", "out.js", "--stdlib", "std.jar"]));

    assert_eq!(
        classpath,
        Classpath::new(vec![
            PathBuf::from("std.jar"),
            PathBuf::from("a.jar"),
            PathBuf::from("b"),
        ])
    );
}

#[test]
fn cleared_stdlib_is_not_on_classpath() {
    let (_, classpath) = build(&options(&[
        "--stdlib",
        "std.jar",
        "a.jar",
        "-o",
        "out.js",
        "--noStdlib",
    ]));

    assert_eq!(classpath.entries(), &[PathBuf::from("a.jar")]);
}

#[test]
fn fast_opt_config() {
    let (config, _) = build(&options(&["-o", "out.js"]));

    assert!(config.optimizer);
    assert!(!config.closure_compiler);
    assert_eq!(config.semantics, Semantics::default());
    assert!(config.parallel);
    assert!(config.batch_mode);
}

#[test]
fn full_opt_upgrades_semantics() {
    let (config, _) = build(&options(&["-o", "out.js", "-u"]));

    assert!(config.optimizer);
    assert!(config.closure_compiler);
    assert_eq!(config.semantics, Semantics::default().optimized());
    assert!(config.semantics.production_mode);
}

#[test]
fn full_opt_keeps_compliant_as_instance_ofs() {
    let (config, _) = build(&options(&["-o", "out.js", "--compliantAsInstanceOfs", "-u"]));

    assert_eq!(config.semantics.as_instance_ofs, CheckedBehavior::Compliant);
    assert!(config.semantics.production_mode);
}

#[test]
fn no_opt_disables_optimizer_and_minifier() {
    let (config, _) = build(&options(&["-o", "out.js", "-u", "-p", "-n"]));

    assert!(!config.optimizer);
    assert!(!config.closure_compiler);
    assert!(!config.semantics.production_mode);
    assert!(config.parallel);
    assert!(config.batch_mode);
}

#[test]
fn implicit_and_explicit_fast_opt_configs_match() {
    assert_eq!(
        build(&options(&["-o", "out.js", "lib"])),
        build(&options(&["-f", "-o", "out.js", "lib"]))
    );
}

#[test]
fn pass_through_fields() {
    let (config, _) = build(&options(&[
        "-o",
        "out.js",
        "-k",
        "ESModule",
        "-s",
        "-r",
        "maps",
        "-c",
        "-p",
        "--es2015",
    ]));

    assert_eq!(config.module_kind, ModuleKind::ESModule);
    assert!(config.source_map);
    assert!(config.check_ir);
    assert!(config.pretty_print);
    assert!(config.es_features.use_ecmascript_2015());
    assert!(config
        .relativize_source_map_base
        .expect("Relativize base should be set")
        .as_str()
        .ends_with("/maps/"));
}
