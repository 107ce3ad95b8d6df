use chrono::{TimeZone, Utc};
use std::path::Path;

use refgraph::report::assemble_report_at;
use refgraph::{analyze, BuildType, GraphBuilder, StaticProvider};

use crate::common::{scenario_a, scenario_b};

#[test]
fn scenario_a_order_and_dependents() {
    let graph = analyze("/opt/app/T", scenario_a()).expect("analyze");
    assert_eq!(graph.registry().names(), vec!["T", "A", "B"]);

    let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let report = assemble_report_at(&graph, &when);
    assert_eq!(report.names(), vec!["T", "A", "B"]);

    let t = report.entry("T").unwrap();
    assert!(t.target);
    assert_eq!(t.dependency_names(), vec!["A", "B"]);
    assert!(t.referenced_by.is_empty());

    let a = report.entry("A").unwrap();
    assert_eq!(a.dependency_names(), vec!["B"]);
    assert_eq!(a.dependent_names(), vec!["T"]);

    let b = report.entry("B").unwrap();
    assert!(b.identity.found);
    assert_eq!(b.identity.build_type, BuildType::Debug);
    assert_eq!(b.dependent_names(), vec!["T", "A"]);
}

#[test]
fn scenario_b_unloadable_dependency() {
    let graph = analyze("/opt/app/T", scenario_b()).expect("analyze");
    let report = assemble_report_at(&graph, &Utc::now());

    let x = report.entry("X").unwrap();
    assert!(!x.identity.found);
    assert_eq!(x.identity.build_type, BuildType::Unknown);
    assert!(x.depends_on.is_empty());
    assert_eq!(x.dependent_names(), vec!["T", "A"]);

    let t = report.target().unwrap();
    assert_eq!(t.dependency_names(), vec!["X", "A"]);
    let listed = &t.depends_on[0];
    assert_eq!(listed.name, "X");
    assert!(!listed.found);
}

#[test]
fn cycles_terminate() {
    let provider = StaticProvider::new()
        .with_path("/bin/t", "T", BuildType::Release, &["A"])
        .with_module("A", BuildType::Release, &["B"])
        .with_module("B", BuildType::Release, &["A", "T"]);
    let graph = analyze("/bin/t", provider).expect("analyze");
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.dependency_names("B"), Some(vec!["A", "T"]));

    let report = assemble_report_at(&graph, &Utc::now());
    assert_eq!(report.entry("T").unwrap().dependent_names(), vec!["B"]);
    assert_eq!(report.entry("A").unwrap().dependent_names(), vec!["T", "B"]);
    assert!(report.modules.iter().all(|m| m.identity.found));
}

#[test]
fn two_module_cycle_terminates_with_each_listed_once() {
    let provider = StaticProvider::new()
        .with_path("/bin/a", "A", BuildType::Release, &["B"])
        .with_module("B", BuildType::Release, &["A"]);
    let graph = analyze("/bin/a", provider).expect("analyze");
    assert_eq!(graph.registry().names(), vec!["A", "B"]);

    let report = assemble_report_at(&graph, &Utc::now());
    assert_eq!(report.names(), vec!["A", "B"]);
    let a = report.entry("A").unwrap();
    let b = report.entry("B").unwrap();
    assert!(a.target);
    assert_eq!(a.dependency_names(), vec!["B"]);
    assert_eq!(b.dependency_names(), vec!["A"]);
    assert_eq!(a.dependent_names(), vec!["B"]);
    assert_eq!(b.dependent_names(), vec!["A"]);
}

#[test]
fn each_module_is_looked_up_once() {
    let mut provider = StaticProvider::new()
        .with_path("/bin/t", "T", BuildType::Release, &["A", "B", "C"])
        .with_module("A", BuildType::Release, &["C", "B"])
        .with_module("B", BuildType::Release, &["C", "missing"])
        .with_module("C", BuildType::Release, &["missing"]);
    {
        let mut builder = GraphBuilder::new(&mut provider);
        builder.load_target(Path::new("/bin/t")).expect("target");
        let graph = builder.finish().expect("finish");
        assert_eq!(graph.registry().names(), vec!["T", "A", "C", "missing", "B"]);
    }
    for name in ["A", "B", "C", "missing"] {
        assert_eq!(provider.lookup_count(name), 1, "{} looked up more than once", name);
    }
    assert_eq!(provider.lookups().len(), 5);
}

#[test]
fn exactly_one_target_even_when_referenced() {
    let provider = StaticProvider::new()
        .with_path("/bin/t", "T", BuildType::Release, &["A"])
        .with_module("A", BuildType::Release, &["T"]);
    let graph = analyze("/bin/t", provider).expect("analyze");
    let report = assemble_report_at(&graph, &Utc::now());
    let targets: Vec<&str> = report
        .modules
        .iter()
        .filter(|m| m.target)
        .map(|m| m.name())
        .collect();
    assert_eq!(targets, vec!["T"]);
    // Leaf records carry identity only.
    let a = report.entry("A").unwrap();
    assert_eq!(a.depends_on[0].name, "T");
}

#[test]
fn repeated_runs_are_identical() {
    let when = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
    let first = assemble_report_at(&analyze("/opt/app/T", scenario_b()).unwrap(), &when);
    let second = assemble_report_at(&analyze("/opt/app/T", scenario_b()).unwrap(), &when);
    assert_eq!(first, second);
    assert_eq!(
        first.to_json_string().unwrap(),
        second.to_json_string().unwrap()
    );
}

#[test]
fn missing_target_produces_no_graph() {
    let err = analyze("/opt/app/nothing", scenario_a()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot load target module /opt/app/nothing: Module not found: /opt/app/nothing"
    );
}
