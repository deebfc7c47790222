//! Integration Tests for the Reconciler
//!
//! These tests drive full render/migrate cycles against an in-memory host
//! and check what the host ends up looking like.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use sprig_core::patch::HostOp;
use sprig_core::vtree::{ON_MOUNT, ON_UNMOUNT};
use sprig_core::{
    attrs, create, leaf, Attrs, Callback, ChangeKind, Child, HostId, ManualTicks, MemoryHost, ReconcileError,
    Reconciler, ReconcilerConfig, SortStrategy, TokioTicks, VNode,
};

fn setup() -> (Reconciler<MemoryHost>, ManualTicks, HostId) {
    setup_with(ReconcilerConfig::default())
}

fn setup_with(config: ReconcilerConfig) -> (Reconciler<MemoryHost>, ManualTicks, HostId) {
    let mut host = MemoryHost::new();
    let root = host.create_root("body");
    let ticks = ManualTicks::new();
    let reconciler = Reconciler::with_config(host, ticks.clone(), config).unwrap();
    (reconciler, ticks, root)
}

fn markup(reconciler: &Reconciler<MemoryHost>, root: HostId) -> String {
    reconciler.with_host(|host| host.inner_markup(root))
}

fn keyed_list(keys: &[&str]) -> VNode {
    create(
        "ul",
        Attrs::new(),
        [keys
            .iter()
            .map(|key| create("li", attrs([("key", *key)]), [*key]))
            .collect::<Vec<_>>()],
    )
}

/// Attribute edits on a mounted element.
#[test]
fn attribute_edits_reach_the_host() {
    let (reconciler, ticks, root) = setup();

    let t0 = reconciler.render(&leaf("div", attrs([("id", "foo"), ("class", "bar")])), root);
    ticks.run_pending().unwrap();

    reconciler.migrate(&t0, &leaf("div", attrs([("id", "foo"), ("title", "baz")])));
    ticks.run_pending().unwrap();

    assert_eq!(markup(&reconciler, root), r#"<div id="foo" title="baz"></div>"#);
}

/// Scenario B: inserting into a keyed list builds only the new item.
#[test]
fn keyed_insertion_builds_only_the_new_item() {
    let (reconciler, ticks, root) = setup();

    let t0 = reconciler.render(&keyed_list(&["one", "three"]), root);
    ticks.run_pending().unwrap();
    let three = reconciler.with_host(|host| host.children(host.children(root)[0])[1]);

    reconciler.migrate(&t0, &keyed_list(&["one", "two", "three"]));
    ticks.run_pending().unwrap();

    assert_eq!(
        markup(&reconciler, root),
        "<ul><li>one</li><li>two</li><li>three</li></ul>"
    );
    let still_three = reconciler.with_host(|host| host.children(host.children(root)[0])[2]);
    assert_eq!(three, still_three);
    assert_eq!(reconciler.stats().moves, 0);
}

/// Scenario A: a rotation is one `Sort` and reuses every node.
#[test]
fn keyed_rotation() {
    let (reconciler, ticks, root) = setup();

    let t0 = reconciler.render(&keyed_list(&["1", "2", "3"]), root);
    ticks.run_pending().unwrap();
    let built = reconciler.stats().nodes_built;

    reconciler.migrate(&t0, &keyed_list(&["2", "3", "1"]));
    ticks.run_pending().unwrap();

    assert_eq!(
        markup(&reconciler, root),
        "<ul><li>2</li><li>3</li><li>1</li></ul>"
    );
    let stats = reconciler.stats();
    assert_eq!(stats.count(ChangeKind::Sort), 1);
    assert_eq!(stats.count(ChangeKind::AddNode), 0);
    assert_eq!(stats.count(ChangeKind::RemoveNode), 0);
    assert_eq!(stats.nodes_built, built);
}

/// Rotation plus append.
#[test]
fn keyed_rotation_with_append() {
    let (reconciler, ticks, root) = setup();

    let t0 = reconciler.render(&keyed_list(&["1", "2", "3"]), root);
    ticks.run_pending().unwrap();

    reconciler.migrate(&t0, &keyed_list(&["2", "3", "1", "4"]));
    ticks.run_pending().unwrap();

    assert_eq!(
        markup(&reconciler, root),
        "<ul><li>2</li><li>3</li><li>1</li><li>4</li></ul>"
    );
}

/// Keyed removal keeps the surviving host nodes.
#[test]
fn keyed_removal_keeps_survivors() {
    let (reconciler, ticks, root) = setup();

    let t0 = reconciler.render(&keyed_list(&["a", "b", "c", "d"]), root);
    ticks.run_pending().unwrap();
    let before: Vec<_> = reconciler.with_host(|host| host.children(host.children(root)[0]).to_vec());

    reconciler.migrate(&t0, &keyed_list(&["a", "c"]));
    ticks.run_pending().unwrap();

    assert_eq!(markup(&reconciler, root), "<ul><li>a</li><li>c</li></ul>");
    let after: Vec<_> = reconciler.with_host(|host| host.children(host.children(root)[0]).to_vec());
    assert_eq!(after, vec![before[0], before[2]]);
}

/// Scenario C: two updates before a tick cost one pass.
#[test]
fn intermediate_tree_is_never_built() {
    let (reconciler, ticks, root) = setup();

    let t0 = reconciler.render(&create("p", Attrs::new(), ["zero"]), root);
    ticks.run_pending().unwrap();

    let t1 = reconciler.migrate(&t0, &create("p", Attrs::new(), [leaf("b", Attrs::new())]));
    let t2 = reconciler.migrate(&t1, &create("p", Attrs::new(), ["two"]));
    assert_eq!(ticks.pending(), 1);

    ticks.run_pending().unwrap();

    assert_eq!(markup(&reconciler, root), "<p>two</p>");
    assert_eq!(reconciler.passes(), 2);
    assert!(t1.host().is_none());
    assert!(t1.children()[0].host().is_none());
    assert!(t2.host().is_some());
    reconciler.with_host(|host| {
        assert!(!host.ops().iter().any(|op| matches!(op, HostOp::CreateElement { tag, .. } if tag == "b")));
    });
}

/// Scenario D: a missing key leaves the host untouched.
#[test]
fn missing_key_leaves_host_untouched() {
    let (reconciler, ticks, root) = setup();

    let t0 = reconciler.render(&keyed_list(&["a", "b"]), root);
    ticks.run_pending().unwrap();
    let ops_before = reconciler.with_host(|host| host.ops().len());

    let broken = create(
        "ul",
        Attrs::new(),
        [vec![
            create("li", attrs([("key", "a")]), ["a"]),
            create("li", Attrs::new(), ["b"]),
        ]],
    );
    reconciler.migrate(&t0, &broken);
    let err = ticks.run_pending().unwrap_err();

    assert!(matches!(err, ReconcileError::MissingKey { index: 1 }));
    assert!(err.to_string().contains("key"));
    assert_eq!(reconciler.with_host(|host| host.ops().len()), ops_before);
    assert_eq!(markup(&reconciler, root), "<ul><li>a</li><li>b</li></ul>");
    assert!(reconciler.baseline().unwrap().ptr_eq(&t0));

    // The reconciler keeps working from the old baseline.
    reconciler.migrate(&t0, &keyed_list(&["b"]));
    ticks.run_pending().unwrap();
    assert_eq!(markup(&reconciler, root), "<ul><li>b</li></ul>");
}

/// Same as above with validation turned off: the differ still catches it.
#[test]
fn differ_rejects_missing_key_without_validation() {
    let config = ReconcilerConfig {
        validate_keys: false,
        ..ReconcilerConfig::default()
    };
    let (reconciler, ticks, root) = setup_with(config);

    let t0 = reconciler.render(&keyed_list(&["a"]), root);
    ticks.run_pending().unwrap();

    let broken = create("ul", Attrs::new(), [vec![leaf("li", Attrs::new())]]);
    reconciler.migrate(&t0, &broken);
    assert!(matches!(
        ticks.run_pending(),
        Err(ReconcileError::MissingKey { index: 0 })
    ));
    assert_eq!(markup(&reconciler, root), "<ul><li>a</li></ul>");
}

#[test]
fn missing_key_fails_first_mount() {
    let (reconciler, ticks, root) = setup();

    reconciler.render(&create("ul", Attrs::new(), [vec![leaf("li", Attrs::new())]]), root);
    assert!(matches!(
        ticks.run_pending(),
        Err(ReconcileError::MissingKey { .. })
    ));
    assert_eq!(markup(&reconciler, root), "");
    assert!(!reconciler.is_mounted());
}

#[test]
fn offline_host_is_rejected() {
    let result = Reconciler::new(MemoryHost::offline(), ManualTicks::new());
    assert!(matches!(result, Err(ReconcileError::NoHostEnvironment)));
}

/// Every lifecycle task runs exactly once, unmounts before mounts.
#[test]
fn lifecycle_tasks_run_once() {
    let (reconciler, ticks, root) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));
    let hook = |name: &'static str| {
        let log = log.clone();
        Callback::new(move || log.lock().push(name))
    };

    let t0 = reconciler.render(
        &create(
            "main",
            Attrs::new(),
            [leaf("aside", attrs([(ON_MOUNT, hook("aside-mount")), (ON_UNMOUNT, hook("aside-unmount"))]))],
        ),
        root,
    );
    ticks.run_pending().unwrap();
    assert_eq!(*log.lock(), vec!["aside-mount"]);

    let t1 = reconciler.migrate(
        &t0,
        &create(
            "main",
            Attrs::new(),
            [leaf("nav", attrs([(ON_MOUNT, hook("nav-mount"))]))],
        ),
    );
    ticks.run_pending().unwrap();

    // An unchanged pass runs nothing.
    reconciler.migrate(&t1, &create("main", Attrs::new(), [leaf("nav", attrs([(ON_MOUNT, hook("nav-mount"))]))]));
    ticks.run_pending().unwrap();

    assert_eq!(*log.lock(), vec!["aside-mount", "aside-unmount", "nav-mount"]);
}

/// A mount task may request another update; it lands in a later tick.
#[test]
fn lifecycle_task_can_migrate_again() {
    let (reconciler, ticks, root) = setup();
    let mounted = Arc::new(AtomicUsize::new(0));

    let handle = reconciler.clone();
    let counter = mounted.clone();
    let on_mount = Callback::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(current) = handle.baseline() {
            handle.migrate(&current, &create("div", Attrs::new(), ["after mount"]));
        }
    });

    reconciler.render(&create("div", attrs([(ON_MOUNT, on_mount)]), ["before"]), root);
    ticks.run_pending().unwrap();
    assert_eq!(markup(&reconciler, root), "<div>before</div>");
    assert!(reconciler.tick_pending());

    ticks.run_until_idle().unwrap();
    assert_eq!(markup(&reconciler, root), "<div>after mount</div>");
    assert_eq!(mounted.load(Ordering::SeqCst), 1);
}

/// Swapping between an element and a keylist keeps trailing siblings put.
#[test]
fn element_and_keylist_swap_in_place() {
    let (reconciler, ticks, root) = setup();
    let page = |middle: Child| create("div", Attrs::new(), [Child::from("head"), middle, Child::from("tail")]);

    let t0 = reconciler.render(&page(Child::from(leaf("hr", Attrs::new()))), root);
    ticks.run_pending().unwrap();

    let t1 = reconciler.migrate(
        &t0,
        &page(Child::from(vec![
            leaf("i", attrs([("key", "x")])),
            leaf("u", attrs([("key", "y")])),
        ])),
    );
    ticks.run_pending().unwrap();
    assert_eq!(markup(&reconciler, root), "<div>head<i></i><u></u>tail</div>");

    reconciler.migrate(&t1, &page(Child::from(leaf("hr", Attrs::new()))));
    ticks.run_pending().unwrap();
    assert_eq!(markup(&reconciler, root), "<div>head<hr></hr>tail</div>");
}

/// An empty keylist fills up before its trailing sibling.
#[test]
fn empty_keylist_fills_before_trailing_sibling() {
    let (reconciler, ticks, root) = setup();
    let page = |keys: &[&str]| {
        create(
            "div",
            Attrs::new(),
            [
                Child::from(keys.iter().map(|key| leaf("i", attrs([("key", *key), ("id", *key)]))).collect::<Vec<_>>()),
                Child::from("tail"),
            ],
        )
    };

    let t0 = reconciler.render(&page(&[]), root);
    ticks.run_pending().unwrap();

    reconciler.migrate(&t0, &page(&["a", "b"]));
    ticks.run_pending().unwrap();
    assert_eq!(
        markup(&reconciler, root),
        r#"<div><i id="a"></i><i id="b"></i>tail</div>"#
    );
}

/// Items added to a keylist land before the next sibling that has a host
/// node, skipping an empty keylist in between.
#[test]
fn keylist_additions_skip_empty_neighbour() {
    let (reconciler, ticks, root) = setup();
    let item = |key: &str| leaf("i", attrs([("key", key), ("id", key)]));
    let page = |first: &[&str], second: &[&str]| {
        create(
            "div",
            Attrs::new(),
            [
                Child::from(first.iter().map(|key| item(*key)).collect::<Vec<_>>()),
                Child::from(second.iter().map(|key| item(*key)).collect::<Vec<_>>()),
                Child::from("tail"),
            ],
        )
    };

    let t0 = reconciler.render(&page(&["a"], &[]), root);
    ticks.run_pending().unwrap();

    let t1 = reconciler.migrate(&t0, &page(&["a", "b"], &[]));
    ticks.run_pending().unwrap();
    assert_eq!(
        markup(&reconciler, root),
        r#"<div><i id="a"></i><i id="b"></i>tail</div>"#
    );

    reconciler.migrate(&t1, &page(&["a", "b"], &["c"]));
    ticks.run_pending().unwrap();
    assert_eq!(
        markup(&reconciler, root),
        r#"<div><i id="a"></i><i id="b"></i><i id="c"></i>tail</div>"#
    );
}

/// A keylist rendered straight into the target can be emptied and refilled.
#[test]
fn root_keylist_refills_after_emptying() {
    let (reconciler, ticks, root) = setup();
    let list = |keys: &[&str]| VNode::keylist(keys.iter().map(|key| leaf("i", attrs([("key", *key), ("id", *key)]))).collect());

    let t0 = reconciler.render(&list(&["a"]), root);
    ticks.run_pending().unwrap();
    assert_eq!(markup(&reconciler, root), r#"<i id="a"></i>"#);

    let t1 = reconciler.migrate(&t0, &list(&[]));
    ticks.run_pending().unwrap();
    assert_eq!(markup(&reconciler, root), "");

    reconciler.migrate(&t1, &list(&["b", "c"]));
    ticks.run_pending().unwrap();
    assert_eq!(markup(&reconciler, root), r#"<i id="b"></i><i id="c"></i>"#);
    assert!(reconciler.baseline().is_some_and(|base| base.children()[0].host().is_some()));
}

/// The naive strategy gets reversals right where the minimal one may not.
#[test]
fn move_all_handles_reversal() {
    let config = ReconcilerConfig {
        sort_strategy: SortStrategy::MoveAll,
        ..ReconcilerConfig::default()
    };
    let (reconciler, ticks, root) = setup_with(config);

    let t0 = reconciler.render(&keyed_list(&["a", "b", "c"]), root);
    ticks.run_pending().unwrap();

    reconciler.migrate(&t0, &keyed_list(&["c", "b", "a"]));
    ticks.run_pending().unwrap();

    assert_eq!(
        markup(&reconciler, root),
        "<ul><li>c</li><li>b</li><li>a</li></ul>"
    );
    assert_eq!(reconciler.stats().moves, 3);
}

#[test]
fn reconcilers_are_independent() {
    let (first, first_ticks, first_root) = setup();
    let (second, second_ticks, second_root) = setup();

    first.render(&leaf("a", Attrs::new()), first_root);
    second.render(&leaf("b", Attrs::new()), second_root);
    first_ticks.run_pending().unwrap();

    assert_eq!(markup(&first, first_root), "<a></a>");
    assert_eq!(markup(&second, second_root), "");

    second_ticks.run_pending().unwrap();
    assert_eq!(markup(&second, second_root), "<b></b>");
}

#[tokio::test]
async fn tokio_driver_batches_updates() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut host = MemoryHost::new();
    let root = host.create_root("body");
    let ticks = TokioTicks::current().unwrap();
    let reconciler = Reconciler::new(host, ticks).unwrap();

    let t0 = reconciler.render(&create("p", Attrs::new(), ["0"]), root);
    let t1 = reconciler.migrate(&t0, &create("p", Attrs::new(), ["1"]));
    reconciler.migrate(&t1, &create("p", Attrs::new(), ["2"]));

    for _ in 0..100 {
        if reconciler.passes() == 1 && !reconciler.tick_pending() {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert_eq!(markup(&reconciler, root), "<p>2</p>");
    assert_eq!(reconciler.passes(), 1);
    assert!(t0.host().is_none());
}
