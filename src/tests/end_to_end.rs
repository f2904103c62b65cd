//! Several units through the store, the way a parallel build runs them.

use crate::{
    checker::{Checker, NameResolver},
    collector::Collector,
    config::Config,
    diagnostics::{DiagnosticKind, Location},
    events::{AttributeArg, CallSite, Declaration, MessageNameSource, UnitEvents},
    signature::{ArgumentType, SignatureMatcher},
    store::Store,
};
use std::path::PathBuf;
use tempfile::tempdir;

fn declaration(name: &str, params: &[&str]) -> Declaration {
    Declaration::new(name, params.iter().map(|p| AttributeArg::from(*p)).collect())
}

fn collect(store: &Store, declarations: Vec<Declaration>) -> bool {
    let mut collector = Collector::from_store(store).expect("load store");
    collector.collect_unit(&UnitEvents {
        declarations,
        calls: Vec::new(),
    });
    let report = collector.finish(store).expect("finish");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    report.persisted
}

#[test]
fn widget_scenario() {
    let dir = tempdir().expect("tempdir");
    let store = Store::new(dir.path().join("messages.store"));
    assert!(collect(&store, vec![declaration("widget", &["int", "char *"])]));

    let registry = store.load_nonempty().expect("load");
    let checker = Checker::new(&registry, SignatureMatcher::default(), NameResolver::default());

    let good = CallSite::literal(
        "widget",
        vec![ArgumentType::integer("int", false), ArgumentType::new("char[5]")],
    );
    assert!(checker.check_call(&good).is_empty());

    let short = CallSite::literal("widget", vec![ArgumentType::integer("int", false)]);
    let diags = checker.check_call(&short);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::ArityMismatch { expected: 2, got: 1 });

    let unknown = CallSite::literal("gadget", vec![]).at(Location::new("gadget.c", 2, 3));
    let diags = checker.check_call(&unknown);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::UnknownMessage);
    assert_eq!(diags[0].message_name.as_deref(), Some("gadget"));
}

#[test]
fn units_accumulate_in_any_order() {
    let dir = tempdir().expect("tempdir");
    let forward = Store::new(dir.path().join("forward.store"));
    let backward = Store::new(dir.path().join("backward.store"));

    let units = [
        vec![declaration("node", &["pcmk_node_t *", "bool"])],
        vec![
            declaration("ticket", &["pcmk__ticket_t *"]),
            declaration("node", &["pcmk_node_t *", "bool"]),
        ],
        vec![declaration("version", &[])],
    ];
    for unit in units.iter() {
        collect(&forward, unit.clone());
    }
    for unit in units.iter().rev() {
        collect(&backward, unit.clone());
    }

    let a = forward.load().expect("load");
    assert_eq!(a.len(), 3);
    assert_eq!(a, backward.load().expect("load"));
    assert!(!collect(&forward, units[1].clone()));
}

#[test]
fn conflicting_unit_leaves_store_untouched() {
    let dir = tempdir().expect("tempdir");
    let store = Store::new(dir.path().join("messages.store"));
    collect(&store, vec![declaration("widget", &["int"])]);
    let before = std::fs::read_to_string(store.path()).expect("read");

    let mut collector = Collector::from_store(&store).expect("load");
    collector.declare(&declaration("widget", &["bool"]));
    let report = collector.finish(&store).expect("finish");
    assert!(!report.persisted);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(std::fs::read_to_string(store.path()).expect("read"), before);
}

#[test]
fn configured_candidates_and_aliases_apply() {
    let dir = tempdir().expect("tempdir");
    let store = Store::new(dir.path().join("messages.store"));
    collect(
        &store,
        vec![
            declaration("bundle", &["my_res_t *"]),
            declaration("container", &["my_res_t *"]),
        ],
    );

    let config = Config::parse(
        r#"
[aliases]
"struct my_res_t *" = "my_res_t *"

[names]
candidates = ["bundle", "container"]
"#,
        &PathBuf::from("fosa.toml"),
    )
    .expect("config");
    let registry = store.load_nonempty().expect("load");
    let checker = Checker::new(
        &registry,
        SignatureMatcher::new(config.match_rules()),
        config.name_resolver(),
    );

    let call = CallSite::new(
        MessageNameSource::HelperCall("crm_element_name".into()),
        vec![ArgumentType::new("struct my_res_t *")],
    );
    assert!(checker.check_call(&call).is_empty());

    let default_checker =
        Checker::new(&registry, SignatureMatcher::default(), NameResolver::default());
    let diags = default_checker.check_call(&call);
    // clone, group and primitive are unknown; bundle fails on the missing alias.
    assert_eq!(diags.len(), 4);
    assert_eq!(
        diags
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnknownMessage)
            .count(),
        3
    );
}
