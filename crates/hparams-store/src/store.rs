//! The [`HierarchicalStore`]: keypath insertion and layered resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConflictKind, Result, StoreError};
use crate::keypath::{join_keypath, split_keypath, validate_key};
use crate::node::{Node, Value};

/// Default character separating keypath segments.
pub const DEFAULT_SEPARATOR: char = '.';

/// Construction-time configuration of a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Character separating segments of a keypath.
    pub separator: char,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

/// A tree of parameters addressed by separator-delimited keypaths.
///
/// The store owns a root [`Node`]. It is mutated only through
/// [`insert`](Self::insert), which refuses to turn a scalar into a sub-tree or
/// the reverse. [`resolve`](Self::resolve) merges values along a descent path
/// with deeper levels taking precedence.
///
/// There is no internal locking; share it behind an `RwLock` if needed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HierarchicalStore {
    root: Node,
    config: StoreConfig,
}

impl HierarchicalStore {
    /// Create an empty store with the default separator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            root: Node::new(),
            config,
        }
    }

    /// Create an empty store using `separator` between keypath segments.
    pub fn with_separator(separator: char) -> Self {
        Self::with_config(StoreConfig { separator })
    }

    /// Create a store around an already materialized tree.
    ///
    /// Every key at every level must be non-empty and free of the separator,
    /// otherwise the tree could hold entries no keypath can reach.
    pub fn from_node(root: Node, config: StoreConfig) -> Result<Self> {
        validate_tree(&root, config.separator)?;
        Ok(Self { root, config })
    }

    /// The configured separator.
    pub fn separator(&self) -> char {
        self.config.separator
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Consume the store, returning its root node.
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Bind `value` at `keypath`, creating intermediate levels as needed.
    ///
    /// An existing scalar at the terminal key is overwritten. Fails with
    /// [`StoreError::PathConflict`] if a directory segment is already a
    /// scalar or the terminal key is already a sub-tree; in that case the
    /// tree is left untouched.
    pub fn insert(&mut self, keypath: &str, value: impl Into<String>) -> Result<()> {
        let separator = self.config.separator;
        let mut segments = split_keypath(keypath, separator)?;
        // split_keypath never returns an empty vector.
        let key = segments.pop().unwrap_or_default();

        let mut dest = &mut self.root;
        for segment in segments {
            dest = descend_or_create(dest, segment, keypath)?;
        }

        match dest.position(key) {
            Some(idx) => {
                let slot = dest.value_at_mut(idx);
                if slot.is_subtree() {
                    return Err(StoreError::PathConflict {
                        segment: key.to_string(),
                        keypath: keypath.to_string(),
                        kind: ConflictKind::SubTreeAtKey,
                    });
                }
                *slot = Value::Scalar(value.into());
            }
            None => {
                dest.push(key.to_string(), Value::Scalar(value.into()));
            }
        }
        Ok(())
    }

    /// Merge the scalar values of `keys` found along `path`.
    ///
    /// Starting at the root, every level visited contributes the keys it
    /// binds to scalars, overwriting values from shallower levels. Descent
    /// stops at the first path segment that is missing or not a sub-tree;
    /// later segments are never consulted. Keys bound only to sub-trees, or
    /// not bound at all, are absent from the result.
    pub fn resolve(&self, keys: &[&str], path: &[&str]) -> BTreeMap<String, String> {
        let mut result = BTreeMap::new();
        self.walk(path, |node| {
            for key in keys {
                if let Some(value) = node.scalar(key) {
                    result.insert((*key).to_string(), value.to_string());
                }
            }
        });
        result
    }

    /// Like [`resolve`](Self::resolve), but merges every scalar of every
    /// visited level.
    pub fn resolve_all(&self, path: &[&str]) -> BTreeMap<String, String> {
        let mut result = BTreeMap::new();
        self.walk(path, |node| {
            for (key, value) in node.iter() {
                if let Value::Scalar(value) = value {
                    result.insert(key.to_string(), value.clone());
                }
            }
        });
        result
    }

    /// Look up the value bound at exactly `keypath`.
    pub fn get(&self, keypath: &str) -> Option<&Value> {
        let mut segments = split_keypath(keypath, self.config.separator).ok()?;
        let key = segments.pop()?;
        self.subtree(&segments)?.get(key)
    }

    /// Look up the scalar bound at exactly `keypath`.
    pub fn get_scalar(&self, keypath: &str) -> Option<&str> {
        self.get(keypath).and_then(Value::as_scalar)
    }

    /// The node reached by following `path` through sub-trees, if every
    /// segment exists.
    pub fn subtree(&self, path: &[&str]) -> Option<&Node> {
        path.iter()
            .try_fold(&self.root, |node, segment| node.subtree(segment))
    }

    /// Every scalar as a `(keypath, value)` pair, depth first in insertion
    /// order.
    ///
    /// Inserting these pairs into an empty store with the same separator
    /// rebuilds this tree, except for empty sub-trees which have no keypath.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        flatten_into(&self.root, &mut prefix, self.config.separator, &mut out);
        out
    }

    /// Number of scalar values in the whole tree.
    pub fn scalar_count(&self) -> usize {
        count_scalars(&self.root)
    }

    fn walk<'a>(&'a self, path: &[&str], mut visit: impl FnMut(&'a Node)) {
        let mut current = Some(&self.root);
        let mut idx = 0;
        while let Some(node) = current {
            visit(node);
            current = match path.get(idx) {
                Some(segment) => node.subtree(segment),
                None => None,
            };
            idx += 1;
        }
    }
}

fn descend_or_create<'a>(node: &'a mut Node, segment: &str, keypath: &str) -> Result<&'a mut Node> {
    let idx = match node.position(segment) {
        Some(idx) => idx,
        None => {
            debug!(segment, keypath, "creating parameter sub-tree");
            node.push(segment.to_string(), Value::SubTree(Node::new()))
        }
    };
    match node.value_at_mut(idx) {
        Value::SubTree(child) => Ok(child),
        Value::Scalar(_) => Err(StoreError::PathConflict {
            segment: segment.to_string(),
            keypath: keypath.to_string(),
            kind: ConflictKind::ScalarInPath,
        }),
    }
}

fn validate_tree(node: &Node, separator: char) -> Result<()> {
    for (key, value) in node.iter() {
        validate_key(key, separator)?;
        if let Value::SubTree(child) = value {
            validate_tree(child, separator)?;
        }
    }
    Ok(())
}

fn flatten_into<'a>(
    node: &'a Node,
    prefix: &mut Vec<&'a str>,
    separator: char,
    out: &mut Vec<(String, String)>,
) {
    for (key, value) in node.iter() {
        prefix.push(key);
        match value {
            Value::Scalar(s) => out.push((join_keypath(prefix.as_slice(), separator), s.clone())),
            Value::SubTree(child) => flatten_into(child, prefix, separator, out),
        }
        prefix.pop();
    }
}

fn count_scalars(node: &Node) -> usize {
    node.iter()
        .map(|(_, value)| match value {
            Value::Scalar(_) => 1,
            Value::SubTree(child) => count_scalars(child),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Store with `k` set at three levels of specificity.
    fn layered() -> HierarchicalStore {
        let mut store = HierarchicalStore::new();
        store.insert("k", "root").unwrap();
        store.insert("a.k", "mid").unwrap();
        store.insert("a.b.k", "leaf").unwrap();
        store
    }

    // ---- Insertion ----

    #[test]
    fn insert_then_resolve_round_trip() {
        let mut store = HierarchicalStore::new();
        store.insert("p1.p2.k", "v").unwrap();
        assert_eq!(store.resolve(&["k"], &["p1", "p2"]), map(&[("k", "v")]));
    }

    #[test]
    fn insert_creates_intermediate_levels() {
        let mut store = HierarchicalStore::new();
        store.insert("bar.baz.c", "6").unwrap();
        let baz = store.subtree(&["bar", "baz"]).unwrap();
        assert_eq!(baz.scalar("c"), Some("6"));
    }

    #[test]
    fn insert_builds_expected_tree() {
        let root = Node::new()
            .with("a", "1")
            .with("b", "2")
            .with("foo", Node::new().with("a", "3"))
            .with("bar", Node::new().with("a", "4"));
        let mut store = HierarchicalStore::from_node(root, StoreConfig::default()).unwrap();

        store.insert("c", "3").unwrap();
        store.insert("bar.c", "5").unwrap();
        store.insert("bar.baz.c", "6").unwrap();

        let expected = Node::new()
            .with("a", "1")
            .with("b", "2")
            .with("foo", Node::new().with("a", "3"))
            .with(
                "bar",
                Node::new()
                    .with("a", "4")
                    .with("c", "5")
                    .with("baz", Node::new().with("c", "6")),
            )
            .with("c", "3");
        assert_eq!(store.root(), &expected);
    }

    #[test]
    fn last_write_wins() {
        let mut store = HierarchicalStore::new();
        store.insert("a", "1").unwrap();
        store.insert("a", "2").unwrap();
        assert_eq!(store.resolve(&["a"], &[]), map(&[("a", "2")]));
    }

    #[test]
    fn repeated_insert_is_idempotent() {
        let mut store = HierarchicalStore::new();
        store.insert("x.y", "1").unwrap();
        let once = store.clone();
        store.insert("x.y", "1").unwrap();
        assert_eq!(store, once);
    }

    #[test]
    fn conflict_inserting_below_scalar() {
        let mut store = HierarchicalStore::new();
        store.insert("bar", "4").unwrap();
        let err = store.insert("bar.baz", "1").unwrap_err();
        assert!(
            matches!(
                &err,
                StoreError::PathConflict { segment, kind: ConflictKind::ScalarInPath, .. }
                    if segment == "bar"
            ),
            "expected PathConflict, got: {err}"
        );
    }

    #[test]
    fn conflict_overwriting_subtree() {
        let mut store = HierarchicalStore::new();
        store.insert("bar.baz", "1").unwrap();
        let err = store.insert("bar", "4").unwrap_err();
        assert!(matches!(
            err,
            StoreError::PathConflict { kind: ConflictKind::SubTreeAtKey, .. }
        ));
    }

    #[test]
    fn conflict_through_deep_scalar() {
        let mut store = HierarchicalStore::new();
        store.insert("bar.baz.c", "6").unwrap();
        let err = store.insert("bar.baz.c.d", "6").unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("bar.baz.c.d"));
    }

    #[test]
    fn failed_insert_leaves_store_unchanged() {
        let mut store = layered();
        let before = store.clone();
        assert!(store.insert("a.k.z.w", "x").is_err());
        assert!(store.insert("a", "x").is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn reject_invalid_keypaths() {
        let mut store = HierarchicalStore::new();
        for bad in ["", ".", "a..b", ".a", "a."] {
            let err = store.insert(bad, "1").unwrap_err();
            assert!(matches!(err, StoreError::InvalidKeyPath { .. }), "{bad:?}");
        }
        assert!(store.is_empty());
    }

    #[test]
    fn custom_separator() {
        let mut store = HierarchicalStore::with_separator('/');
        store.insert("tasks/sieve/lim.0", "100").unwrap();
        assert_eq!(store.get_scalar("tasks/sieve/lim.0"), Some("100"));
        assert_eq!(
            store.resolve(&["lim.0"], &["tasks", "sieve"]),
            map(&[("lim.0", "100")])
        );
    }

    #[test]
    fn from_node_rejects_unreachable_keys() {
        let root = Node::new().with("a.b", "1");
        assert!(HierarchicalStore::from_node(root.clone(), StoreConfig::default()).is_err());
        assert!(HierarchicalStore::from_node(root, StoreConfig { separator: '/' }).is_ok());

        let nested_empty = Node::new().with("x", Node::new().with("", "1"));
        assert!(HierarchicalStore::from_node(nested_empty, StoreConfig::default()).is_err());
    }

    // ---- Resolution ----

    #[test]
    fn override_by_specificity() {
        let store = layered();
        assert_eq!(store.resolve(&["k"], &["a", "b"]), map(&[("k", "leaf")]));
        assert_eq!(store.resolve(&["k"], &["a"]), map(&[("k", "mid")]));
        assert_eq!(store.resolve(&["k"], &[]), map(&[("k", "root")]));
    }

    #[test]
    fn partial_path_stops_descent() {
        let store = layered();
        assert_eq!(store.resolve(&["k"], &["a", "x", "b"]), map(&[("k", "mid")]));
    }

    #[test]
    fn missing_key_is_absent() {
        let store = layered();
        assert!(store.resolve(&["nope"], &["a"]).is_empty());
    }

    #[test]
    fn subtree_never_satisfies_a_key() {
        let mut store = HierarchicalStore::new();
        store.insert("a.a", "inner").unwrap();
        // "a" is only a directory at the root.
        assert_eq!(store.resolve(&["a"], &["a"]), map(&[("a", "inner")]));
        assert!(store.resolve(&["a"], &[]).is_empty());
    }

    #[test]
    fn deeper_subtree_does_not_shadow_value() {
        let mut store = HierarchicalStore::new();
        store.insert("k", "root").unwrap();
        store.insert("a.k.x", "1").unwrap();
        assert_eq!(store.resolve(&["k"], &["a"]), map(&[("k", "root")]));
        assert_eq!(store.resolve(&["k", "x"], &["a", "k"]), map(&[("k", "root"), ("x", "1")]));
    }

    #[test]
    fn path_through_scalar_stops() {
        let mut store = HierarchicalStore::new();
        store.insert("a", "scalar").unwrap();
        store.insert("k", "root").unwrap();
        assert_eq!(store.resolve(&["k", "a"], &["a"]), map(&[("a", "scalar"), ("k", "root")]));
    }

    #[test]
    fn resolve_mixes_levels_per_key() {
        let mut store = HierarchicalStore::new();
        store.insert("a", "1").unwrap();
        store.insert("b", "2").unwrap();
        store.insert("foo.a", "3").unwrap();
        store.insert("bar.a", "4").unwrap();
        assert_eq!(
            store.resolve(&["a", "b"], &["foo"]),
            map(&[("a", "3"), ("b", "2")])
        );
    }

    #[test]
    fn resolve_all_merges_every_scalar() {
        let mut store = layered();
        store.insert("a.only_mid", "m").unwrap();
        store.insert("a.b.only_leaf", "l").unwrap();
        assert_eq!(
            store.resolve_all(&["a", "b"]),
            map(&[("k", "leaf"), ("only_leaf", "l"), ("only_mid", "m")])
        );
        assert_eq!(store.resolve_all(&[]), map(&[("k", "root")]));
    }

    // ---- Lookup and enumeration ----

    #[test]
    fn exact_lookup() {
        let store = layered();
        assert_eq!(store.get_scalar("a.b.k"), Some("leaf"));
        assert!(store.get("a.b").unwrap().is_subtree());
        assert!(store.get_scalar("a.b").is_none());
        assert!(store.get("a.c.k").is_none());
        assert!(store.get("a..k").is_none());
    }

    #[test]
    fn flatten_lists_scalars_in_order() {
        let mut store = HierarchicalStore::new();
        store.insert("z", "1").unwrap();
        store.insert("m.b", "2").unwrap();
        store.insert("a", "3").unwrap();
        store.insert("m.a", "4").unwrap();
        assert_eq!(
            store.flatten(),
            vec![
                ("z".to_string(), "1".to_string()),
                ("m.b".to_string(), "2".to_string()),
                ("m.a".to_string(), "4".to_string()),
                ("a".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(store.scalar_count(), 4);
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-c]{1,2}"
    }

    fn keypath() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(segment(), 1..4)
    }

    proptest! {
        #[test]
        fn flatten_rebuilds_tree(
            entries in prop::collection::vec((keypath(), "[0-9]{1,3}"), 0..24)
        ) {
            let mut store = HierarchicalStore::new();
            for (path, value) in &entries {
                let _ = store.insert(&path.join("."), value.as_str());
            }

            let mut rebuilt = HierarchicalStore::new();
            for (keypath, value) in store.flatten() {
                rebuilt.insert(&keypath, value).unwrap();
            }
            prop_assert_eq!(rebuilt, store);
        }

        #[test]
        fn successful_insert_is_visible(
            entries in prop::collection::vec((keypath(), "[0-9]{1,3}"), 1..24)
        ) {
            let mut store = HierarchicalStore::new();
            for (path, value) in &entries {
                let keypath = path.join(".");
                let before = store.clone();
                match store.insert(&keypath, value.as_str()) {
                    Ok(()) => {
                        let (key, dirs) = path.split_last().unwrap();
                        let dirs: Vec<&str> = dirs.iter().map(String::as_str).collect();
                        prop_assert_eq!(store.get_scalar(&keypath), Some(value.as_str()));
                        let resolved = store.resolve(&[key.as_str()], &dirs);
                        prop_assert_eq!(resolved.get(key.as_str()), Some(value));
                    }
                    Err(err) => {
                        prop_assert!(err.is_conflict());
                        prop_assert_eq!(&store, &before);
                    }
                }
            }
        }
    }
}
