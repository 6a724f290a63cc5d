//! Structural guarantees of the forest under mixed insert/set/delete sequences.

use rstest::{fixture, rstest};

use kvtree::domain::{Forest, NodeKind, SearchMode, TreeError, Value, ROOT_KEY};
use kvtree::util::testing;

/// root
/// └── config
///     ├── loglevel = 2
///     └── update
///         ├── interval = 3600
///         └── url = "https://example.org"
#[fixture]
fn config_forest() -> Forest {
    testing::init_test_setup();
    let mut forest = Forest::new();
    forest.insert(ROOT_KEY, "config").unwrap();
    forest.insert("config", "update").unwrap();
    forest.insert("config", "loglevel").unwrap();
    forest.insert("update", "url").unwrap();
    forest.insert("update", "interval").unwrap();
    forest.set_int("loglevel", 2).unwrap();
    forest.set_int("interval", 3600).unwrap();
    forest.set_string("url", "https://example.org").unwrap();
    forest
}

fn preorder(forest: &Forest) -> Vec<String> {
    let walk = forest
        .traverse(forest.root(), "", SearchMode::WholeSubtree)
        .unwrap();
    forest.keys_of(walk.nodes()).into_iter().map(String::from).collect()
}

/// Every parent's children are strictly ascending and every node is either a
/// parent without payload or a leaf with one.
fn assert_well_formed(forest: &Forest) {
    let walk = forest
        .traverse(forest.root(), "", SearchMode::WholeSubtree)
        .unwrap();
    for &idx in walk.nodes() {
        let node = forest.node(idx).expect("live node");
        let keys = forest.keys_of(node.children());
        assert!(
            keys.windows(2).all(|w| w[0] < w[1]),
            "children of {} not ascending: {:?}",
            node.key(),
            keys
        );
        if node.is_leaf() {
            assert!(node.payload().is_some(), "leaf {} holds no value", node.key());
        } else {
            assert!(node.payload().is_none(), "parent {} holds a value", node.key());
        }
    }
}

#[rstest]
fn given_forest_when_walking_then_preorder_with_ascending_siblings(config_forest: Forest) {
    assert_eq!(
        preorder(&config_forest),
        vec!["root", "config", "loglevel", "update", "interval", "url"]
    );
    assert_well_formed(&config_forest);
}

#[rstest]
fn given_forest_when_path_to_target_then_visits_preceding_nodes(config_forest: Forest) {
    let walk = config_forest
        .search("interval", SearchMode::PathToTarget)
        .unwrap();

    assert!(walk.found());
    assert_eq!(
        config_forest.keys_of(walk.nodes()),
        vec!["root", "config", "loglevel", "update", "interval"]
    );
}

#[rstest]
fn given_forest_when_single_search_then_returns_only_target(config_forest: Forest) {
    let walk = config_forest
        .search("config.update.url", SearchMode::Single)
        .unwrap();

    let target = walk.target().expect("url found");
    assert_eq!(config_forest.node(target).unwrap().key(), "url");
    assert!(walk.nodes().is_empty());
}

#[rstest]
fn given_key_used_anywhere_when_inserting_again_then_rejected(mut config_forest: Forest) {
    let before = preorder(&config_forest);

    let result = config_forest.insert(ROOT_KEY, "interval");

    assert!(matches!(result, Err(TreeError::DuplicateKey(k)) if k == "interval"));
    assert_eq!(preorder(&config_forest), before);
    assert_eq!(config_forest.get_int("interval"), 3600);
}

#[rstest]
fn given_leaf_with_value_when_child_added_then_becomes_parent(mut config_forest: Forest) {
    config_forest.insert("loglevel", "verbose").unwrap();

    assert_eq!(config_forest.get_type("loglevel").unwrap(), NodeKind::Parent);
    assert_eq!(config_forest.get_value("loglevel"), None);
    assert!(matches!(
        config_forest.set_int("loglevel", 1),
        Err(TreeError::WrongNodeKind { .. })
    ));
    assert_well_formed(&config_forest);
}

#[rstest]
fn given_only_child_chain_when_deleting_leaf_then_prunes_up_to_branching_ancestor(
    mut config_forest: Forest,
) {
    config_forest.delete("interval").unwrap();
    assert_eq!(config_forest.get_type("update").unwrap(), NodeKind::Parent);

    let released = config_forest.delete("url").unwrap();

    assert_eq!(released, 2, "url and its emptied parent update");
    assert_eq!(config_forest.find("update").unwrap(), None);
    assert_eq!(preorder(&config_forest), vec!["root", "config", "loglevel"]);
    assert_well_formed(&config_forest);
}

#[rstest]
fn given_last_branch_when_deleting_then_root_survives(mut config_forest: Forest) {
    let released = config_forest.delete("config").unwrap();

    assert_eq!(released, 5);
    assert_eq!(config_forest.len(), 1);
    assert!(config_forest.is_empty());
    assert_eq!(config_forest.get_type(ROOT_KEY).unwrap(), NodeKind::Integer);
    assert_eq!(config_forest.get_int(ROOT_KEY), 0);
}

#[test]
fn given_only_child_of_root_when_deleted_then_root_holds_default_integer() {
    testing::init_test_setup();
    let mut forest = Forest::new();
    forest.insert(ROOT_KEY, "only").unwrap();
    assert_eq!(forest.get_value(ROOT_KEY), None);

    forest.delete("only").unwrap();

    assert_eq!(forest.get_value(ROOT_KEY), Some(&Value::Int(0)));
    assert_eq!(forest.get_type(ROOT_KEY).unwrap(), NodeKind::Integer);
    assert_eq!(forest.try_get_int(ROOT_KEY).unwrap(), 0);
    assert_well_formed(&forest);
}

#[rstest]
fn given_root_key_when_deleting_then_clears_but_keeps_root(mut config_forest: Forest) {
    let released = config_forest.delete(ROOT_KEY).unwrap();

    assert_eq!(released, 5);
    assert_eq!(preorder(&config_forest), vec!["root"]);
    assert_eq!(config_forest.get_value(ROOT_KEY), Some(&Value::Int(0)));
    assert_well_formed(&config_forest);
    config_forest.insert(ROOT_KEY, "fresh").unwrap();
    assert_eq!(preorder(&config_forest), vec!["root", "fresh"]);
}

#[rstest]
fn given_missing_key_when_deleting_then_unchanged(mut config_forest: Forest) {
    let before = preorder(&config_forest);

    let result = config_forest.delete("missing");

    assert!(matches!(result, Err(TreeError::NoSuchTarget(_))));
    assert_eq!(preorder(&config_forest), before);
}

#[rstest]
fn given_deleted_key_when_reinserted_then_allowed(mut config_forest: Forest) {
    config_forest.delete("loglevel").unwrap();
    config_forest.insert("update", "loglevel").unwrap();
    config_forest.set_int("loglevel", 5).unwrap();

    assert_eq!(config_forest.get_int("config.update.loglevel"), 5);
    assert_eq!(
        preorder(&config_forest),
        vec!["root", "config", "update", "interval", "loglevel", "url"]
    );
    assert_well_formed(&config_forest);
}

#[rstest]
#[case("loglevel", Value::Str("high".into()))]
#[case("url", Value::Int(7))]
fn given_typed_leaf_when_overwriting_with_other_kind_then_type_mismatch(
    mut config_forest: Forest,
    #[case] key: &str,
    #[case] value: Value,
) {
    let before = config_forest.get_value(key).cloned();

    let result = config_forest.set_value(key, value);

    assert!(matches!(result, Err(TreeError::TypeMismatch { .. })));
    assert_eq!(config_forest.get_value(key).cloned(), before);
}

#[rstest]
fn given_fresh_leaf_when_setting_string_then_becomes_string(mut config_forest: Forest) {
    config_forest.insert("update", "channel").unwrap();
    assert_eq!(config_forest.get_type("channel").unwrap(), NodeKind::Integer);

    config_forest.set_string("channel", "stable").unwrap();

    assert_eq!(config_forest.get_string("channel"), Some("stable"));
    assert_eq!(config_forest.get_type("channel").unwrap(), NodeKind::String);
}

#[rstest]
fn given_search_result_when_node_deleted_then_stale_index_detected(mut config_forest: Forest) {
    let stale = config_forest.find("interval").unwrap().unwrap();
    config_forest.delete("interval").unwrap();

    assert!(config_forest.node(stale).is_none());
    assert!(matches!(
        config_forest.traverse(stale, "", SearchMode::WholeSubtree),
        Err(TreeError::NullRoot)
    ));
}

#[rstest]
fn given_forest_when_torn_down_then_every_node_released_once(config_forest: Forest) {
    let total = config_forest.len();
    assert_eq!(config_forest.teardown().unwrap(), total);
}
