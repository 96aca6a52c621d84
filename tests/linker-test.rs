use std::io::Write;
use std::path::{Path, PathBuf};

use scalajsld::cli::parse_args;
use scalajsld::config::Classpath;
use scalajsld::driver::{DriverError, FileSystemContainers, InputResolutionError, IrContainerSource};
use scalajsld::ir::{IrContainer, IrHeader};
use scalajsld::linking::{LinkError, OutputSink};
use scalajsld::run;
use tempfile::TempDir;
use tracing::Dispatch;

fn ir_bytes(version: &str) -> Vec<u8> {
    let mut bytes = IrHeader::new(version).to_bytes();
    bytes.extend_from_slice(&[0, 1, 2, 3]);
    bytes
}

fn write_ir(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).expect("Cannot create IR directory");
    std::fs::write(path, bytes).expect("Cannot write IR file");
}

fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = std::fs::File::create(path).expect("Cannot create jar");
    let mut zip = zip::ZipWriter::new(file);

    for (name, bytes) in entries {
        zip.start_file(*name, zip::write::FileOptions::default())
            .expect("Cannot start jar entry");
        zip.write_all(bytes).expect("Cannot write jar entry");
    }

    zip.finish().expect("Cannot finish jar");
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// A standard library jar and an application directory.
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Cannot create temp dir");
        let current = ir_bytes(IrHeader::current().version());

        write_jar(
            &dir.path().join("std.jar"),
            &[
                ("java/lang/Object.sjsir", current.clone()),
                ("java/lang/String.sjsir", current.clone()),
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
            ],
        );

        let app = dir.path().join("app");
        write_ir(&app, "com/acme/Main$.sjsir", &current);
        write_ir(&app, "com/acme/Util.sjsir", &current);
        write_ir(&app, "README.txt", b"not IR");

        Fixture { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).to_string_lossy().into_owned()
    }

    fn link(&self, args: &[String]) -> Result<(), DriverError> {
        let args = std::iter::once(String::from("scalajsld")).chain(args.iter().cloned());
        let options = parse_args(args).expect("Failed to parse arguments");

        run(&options, Dispatch::none())
    }

    fn output(&self) -> String {
        std::fs::read_to_string(self.path("out.js")).expect("Cannot read out.js")
    }
}

fn args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

#[test]
fn links_jar_and_directory() {
    let fixture = Fixture::new();

    fixture
        .link(&[
            vec![
                String::from("--stdlib"),
                fixture.arg("std.jar"),
                fixture.arg("app"),
                String::from("-o"),
                fixture.arg("out.js"),
            ],
            args(&["-mm", "com.acme.Main.run"]),
        ]
        .concat())
        .expect("Linking should succeed");

    let js = fixture.output();

    assert!(js.starts_with("(function(){\n  'use strict';\n"));
    assert!(js.contains(r#""com.acme.Main$","com.acme.Util","java.lang.Object","java.lang.String""#));
    assert!(js.contains("$s_Lcom_acme_Main__run__AT__V([]);"));
    assert!(js.trim_end().ends_with("}).call(this);"));
    assert!(!fixture.path("out.js.map").exists());
}

#[test]
fn empty_classpath_fails_and_writes_nothing() {
    let fixture = Fixture::new();

    let err = fixture
        .link(&[String::from("-o"), fixture.arg("out.js")])
        .expect_err("Linking without the standard library should fail");

    assert!(matches!(err, DriverError::Link(LinkError::MissingCoreClass(_))));
    assert!(!fixture.path("out.js").exists());
}

#[test]
fn corrupt_jar_fails_before_linking() {
    let fixture = Fixture::new();
    std::fs::write(fixture.path("broken.jar"), b"definitely not a zip").unwrap();

    let err = fixture
        .link(&[
            fixture.arg("std.jar"),
            fixture.arg("broken.jar"),
            String::from("-o"),
            fixture.arg("out.js"),
        ])
        .expect_err("Corrupt jar should fail");

    assert!(matches!(
        err,
        DriverError::InputResolution(InputResolutionError::CorruptArchive { .. })
    ));
    assert!(!fixture.path("out.js").exists());
}

#[test]
fn missing_entry_fails_before_linking() {
    let fixture = Fixture::new();

    let err = fixture
        .link(&[
            fixture.arg("std.jar"),
            fixture.arg("nowhere"),
            String::from("-o"),
            fixture.arg("out.js"),
        ])
        .expect_err("Missing entry should fail");

    assert!(matches!(
        err,
        DriverError::InputResolution(InputResolutionError::Io { .. })
    ));
}

#[test]
fn newer_ir_version_is_rejected() {
    let fixture = Fixture::new();
    write_ir(&fixture.path("app"), "com/acme/Future.sjsir", &ir_bytes("1.99"));

    let err = fixture
        .link(&[
            fixture.arg("std.jar"),
            fixture.arg("app"),
            String::from("-o"),
            fixture.arg("out.js"),
        ])
        .expect_err("IR 1.99 should be rejected");

    match err {
        DriverError::Link(LinkError::IrVersionMismatch { found, .. }) => assert_eq!(found, "1.99"),
        other => panic!("Unexpected error: {}", other),
    }
    assert!(!fixture.path("out.js").exists());
}

#[test]
fn garbage_ir_is_rejected() {
    let fixture = Fixture::new();
    write_ir(&fixture.path("app"), "com/acme/Broken.sjsir", b"\xCA\xFE\xBA\xBE\0\0");

    let err = fixture
        .link(&[
            fixture.arg("std.jar"),
            fixture.arg("app"),
            String::from("-o"),
            fixture.arg("out.js"),
        ])
        .expect_err("Bad magic should be rejected");

    assert!(matches!(err, DriverError::Link(LinkError::InvalidIrFile { .. })));
}

#[test]
fn unresolved_module_initializer() {
    let fixture = Fixture::new();

    let err = fixture
        .link(&[
            fixture.arg("std.jar"),
            fixture.arg("app"),
            String::from("-o"),
            fixture.arg("out.js"),
            String::from("-mm"),
            String::from("com.acme.Missing.main"),
        ])
        .expect_err("Unknown owner should fail");

    match err {
        DriverError::Link(LinkError::UnresolvedModuleInitializer { owner, method }) => {
            assert_eq!(owner, "com.acme.Missing");
            assert_eq!(method, "main");
        }
        other => panic!("Unexpected error: {}", other),
    }
}

#[test]
fn duplicate_class_only_fails_with_check_ir() {
    let fixture = Fixture::new();
    let current = ir_bytes(IrHeader::current().version());
    write_jar(
        &fixture.path("dup.jar"),
        &[("com/acme/Util.sjsir", current)],
    );

    let base = vec![
        fixture.arg("std.jar"),
        fixture.arg("app"),
        fixture.arg("dup.jar"),
        String::from("-o"),
        fixture.arg("out.js"),
    ];

    fixture
        .link(&base)
        .expect("Duplicates are tolerated without -c");

    let err = fixture
        .link(&[base, args(&["-c"])].concat())
        .expect_err("Duplicates should fail with -c");

    match err {
        DriverError::Link(LinkError::DuplicateClass { name, .. }) => {
            assert_eq!(name, "com.acme.Util")
        }
        other => panic!("Unexpected error: {}", other),
    }
}

#[test]
fn blocked_source_map_leaves_no_output() {
    let dir = tempfile::tempdir().expect("Cannot create temp dir");
    let out = dir.path().join("out.js");
    let map = dir.path().join("out.js.map");

    // A non-empty directory cannot be replaced by the source map
    std::fs::create_dir(&map).unwrap();
    std::fs::write(map.join("keep"), b"").unwrap();

    let sink = OutputSink::new(&out);
    let err = sink
        .write_all(&[(out.clone(), b"js".as_slice()), (map.clone(), b"{}".as_slice())])
        .unwrap_err();

    assert!(matches!(err, LinkError::IoError { ref path, .. } if *path == map));
    assert!(!out.exists());
    assert!(map.join("keep").exists());

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("out.js.map")]);
}

#[test]
fn linking_with_blocked_source_map_fails_cleanly() {
    let fixture = Fixture::new();
    std::fs::create_dir(fixture.path("out.js.map")).unwrap();
    std::fs::write(fixture.path("out.js.map").join("keep"), b"").unwrap();

    let err = fixture
        .link(&[
            String::from("--stdlib"),
            fixture.arg("std.jar"),
            fixture.arg("app"),
            String::from("-s"),
            String::from("-o"),
            fixture.arg("out.js"),
        ])
        .unwrap_err();

    assert!(matches!(err, DriverError::Link(LinkError::IoError { .. })));
    assert!(!fixture.path("out.js").exists());
}

#[test]
fn source_map_is_relativized() {
    let fixture = Fixture::new();
    let std_dir = fixture.path("std");
    write_ir(
        &std_dir,
        "java/lang/Object.sjsir",
        &ir_bytes(IrHeader::current().version()),
    );

    fixture
        .link(&[
            fixture.arg("std"),
            String::from("-o"),
            fixture.arg("out.js"),
            String::from("-s"),
            String::from("-r"),
            fixture.dir.path().to_string_lossy().into_owned(),
        ])
        .expect("Linking should succeed");

    let js = fixture.output();
    assert!(js.ends_with("//# sourceMappingURL=out.js.map\n"));

    let map: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(fixture.path("out.js.map")).expect("Cannot read source map"),
    )
    .expect("Source map should be JSON");

    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "out.js");
    assert_eq!(map["sources"], serde_json::json!(["std/java/lang/Object.sjsir"]));
}

#[test]
fn module_kinds_shape_output() {
    let fixture = Fixture::new();
    let base = vec![fixture.arg("std.jar"), String::from("-o"), fixture.arg("out.js")];

    fixture
        .link(&[base.clone(), args(&["-k", "ESModule", "--es2015"])].concat())
        .expect("Linking should succeed");
    let js = fixture.output();
    assert!(js.starts_with("'use strict';\nconst $linkingInfo"));
    assert!(js.contains("export { $classes };"));

    fixture
        .link(&[base, args(&["-k", "CommonJSModule"])].concat())
        .expect("Linking should succeed");
    let js = fixture.output();
    assert!(js.starts_with("'use strict';\nvar $linkingInfo"));
    assert!(js.contains("exports.$classes = $classes;"));
}

#[test]
fn full_opt_minifies_unless_pretty_printed() {
    let fixture = Fixture::new();
    let base = vec![fixture.arg("std.jar"), String::from("-o"), fixture.arg("out.js"), String::from("-u")];

    fixture.link(&base).expect("Linking should succeed");
    let js = fixture.output();
    assert!(!js.contains('\n'));
    assert!(js.contains(r#""productionMode":true"#));

    fixture
        .link(&[base, args(&["-p"])].concat())
        .expect("Linking should succeed");
    let js = fixture.output();
    assert!(js.contains("\n  'use strict';\n"));
}

#[test]
fn fast_opt_keeps_development_semantics() {
    let fixture = Fixture::new();

    fixture
        .link(&[fixture.arg("std.jar"), String::from("-o"), fixture.arg("out.js")])
        .expect("Linking should succeed");

    let js = fixture.output();
    assert!(js.contains(r#""productionMode":false"#));
    assert!(js.contains(r#""asInstanceOfs":"Fatal""#));
}

#[tokio::test]
async fn containers_list_only_ir_files() {
    let fixture = Fixture::new();
    let source = FileSystemContainers::new();

    let containers = source
        .discover(&Classpath::new(vec![fixture.path("std.jar"), fixture.path("app")]))
        .await
        .expect("Discovery should succeed");

    assert_eq!(
        containers,
        vec![
            IrContainer::Archive(fixture.path("std.jar")),
            IrContainer::Directory(fixture.path("app")),
        ]
    );

    let jar_files: Vec<String> = source
        .enumerate(&containers[0])
        .await
        .unwrap()
        .iter()
        .map(|file| file.relative_path().to_owned())
        .collect();
    assert_eq!(jar_files, vec!["java/lang/Object.sjsir", "java/lang/String.sjsir"]);

    let dir_files: Vec<String> = source
        .enumerate(&containers[1])
        .await
        .unwrap()
        .iter()
        .map(|file| file.class_name())
        .collect();
    assert_eq!(dir_files, vec!["com.acme.Main$", "com.acme.Util"]);
}

#[tokio::test]
async fn single_file_container() {
    let fixture = Fixture::new();
    let path = fixture.path("app").join("com/acme/Util.sjsir");
    let source = FileSystemContainers::new();

    let containers = source
        .discover(&Classpath::new(vec![path.clone()]))
        .await
        .unwrap();
    assert_eq!(containers, vec![IrContainer::SingleFile(path)]);

    let files = source.enumerate(&containers[0]).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].relative_path(), "Util.sjsir");
}
