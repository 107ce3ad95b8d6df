use refgraph::{analyze_path, BuildType, RefGraphError};

use crate::common::{isolated_config, ElfImage};

#[test]
fn runpath_and_configured_paths_resolve_dependencies() {
    let root = tempfile::tempdir().unwrap();
    let app_dir = root.path().join("app");
    let extra = root.path().join("extra");

    let target = ElfImage::new()
        .needed(&["libfoo.so.1", "libmissing.so.3"])
        .runpath("$ORIGIN/lib")
        .write_to(&app_dir, "app");
    ElfImage::new()
        .soname("libfoo.so.1")
        .needed(&["libbar.so"])
        .debug()
        .write_to(&app_dir.join("lib"), "libfoo.so.1");
    ElfImage::new()
        .soname("libbar.so")
        .needed(&["libfoo.so.1"])
        .write_to(&extra, "libbar.so");

    let mut config = isolated_config();
    config.search.paths.push(extra.clone());
    let report = analyze_path(&target, &config).expect("analysis");

    assert_eq!(
        report.names(),
        vec!["app", "libfoo.so.1", "libbar.so", "libmissing.so.3"]
    );

    let app = report.target().unwrap();
    assert_eq!(app.name(), "app");
    assert_eq!(app.identity.build_type, BuildType::Release);
    assert_eq!(
        app.dependency_names(),
        vec!["libfoo.so.1", "libmissing.so.3"]
    );

    let foo = report.entry("libfoo.so.1").unwrap();
    assert!(foo.identity.found);
    assert_eq!(foo.identity.build_type, BuildType::Debug);
    assert_eq!(foo.dependent_names(), vec!["app", "libbar.so"]);

    let bar = report.entry("libbar.so").unwrap();
    assert!(bar.identity.found);
    assert_eq!(bar.dependent_names(), vec!["libfoo.so.1"]);

    let missing = report.entry("libmissing.so.3").unwrap();
    assert!(!missing.identity.found);
    assert_eq!(missing.identity.build_type, BuildType::Unknown);
}

#[test]
fn target_is_named_by_soname() {
    let dir = tempfile::tempdir().unwrap();
    let target = ElfImage::new()
        .soname("libplugin.so.2")
        .write_to(dir.path(), "plugin-build-output.so");
    let report = analyze_path(&target, &isolated_config()).expect("analysis");
    assert_eq!(report.names(), vec!["libplugin.so.2"]);
    assert!(report.target().unwrap().depends_on.is_empty());
}

#[test]
fn sibling_of_target_is_found_without_search_paths() {
    let dir = tempfile::tempdir().unwrap();
    let target = ElfImage::new().needed(&["libside.so"]).write_to(dir.path(), "tool");
    ElfImage::new().debug().write_to(dir.path(), "libside.so");
    let report = analyze_path(&target, &isolated_config()).expect("analysis");
    let side = report.entry("libside.so").unwrap();
    assert!(side.identity.found);
    assert_eq!(side.identity.build_type, BuildType::Debug);
}

#[test]
fn corrupt_dependency_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let target = ElfImage::new().needed(&["libjunk.so"]).write_to(dir.path(), "tool");
    std::fs::write(dir.path().join("libjunk.so"), b"\x7FELF\x02\x01").unwrap();
    let report = analyze_path(&target, &isolated_config()).expect("analysis");
    assert!(!report.entry("libjunk.so").unwrap().identity.found);
}

#[test]
fn unparseable_target_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("notes.txt");
    std::fs::write(&target, b"plain text").unwrap();
    let err = analyze_path(&target, &isolated_config()).unwrap_err();
    assert!(matches!(err, RefGraphError::TargetLoad { .. }));
}
