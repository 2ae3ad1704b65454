//! Anchor and merge planning for the YAML dumper.
//!
//! Every nested mapping of the tree is visited in document pre-order.
//! A mapping becomes anchor-worthy when a later mapping is identical to it,
//! or when a later mapping is a near superset of it: a mapping that holds
//! all of its keys and differs in at most half of its own entries. Near
//! supersets are written as `<<: *anchor` followed by their differing
//! entries only.

use std::collections::HashMap;

use log::debug;
use twox_hash::XxHash64;

use crate::translation::types::models::{Node, Tree, identical};

/// Hashes the order-preserving serialization of a mapping.
///
/// Every key and scalar is length-prefixed and nested mappings are
/// bracketed by their entry count, so distinct trees never share a byte
/// stream.
pub fn fingerprint(tree: &Tree) -> u64 {
    fn serialize(tree: &Tree, out: &mut Vec<u8>) {
        out.push(b'{');
        out.extend_from_slice(&(tree.len() as u64).to_le_bytes());
        for (key, node) in tree {
            out.extend_from_slice(&(key.len() as u64).to_le_bytes());
            out.extend_from_slice(key.as_bytes());
            match node {
                Node::Scalar(value) => {
                    out.push(b's');
                    out.extend_from_slice(&(value.len() as u64).to_le_bytes());
                    out.extend_from_slice(value.as_bytes());
                }
                Node::Mapping(child) => serialize(child, out),
            }
        }
        out.push(b'}');
    }

    let mut bytes = Vec::new();
    serialize(tree, &mut bytes);
    XxHash64::oneshot(0, &bytes)
}

/// A planned `<<: *anchor` rendering of one mapping.
#[derive(Debug)]
pub struct Merge<'t> {
    /// Anchor identifier of the merged mapping.
    pub anchor: usize,
    /// Entries written after the merge key.
    pub diff: Tree,
    /// The mapping rendered this way.
    target: &'t Tree,
    /// `diff.len() / target.len()`, kept as a fraction.
    ratio: (usize, usize),
}

/// Anchors and merges for one dump call.
#[derive(Debug, Default)]
pub struct AnchorPlan<'t> {
    /// Anchor-worthy mappings; the identifier of `anchors[i]` is `i + 1`.
    anchors: Vec<&'t Tree>,
    anchor_index: HashMap<u64, Vec<usize>>,
    merges: HashMap<u64, Vec<Merge<'t>>>,
}

impl<'t> AnchorPlan<'t> {
    /// A plan without anchors; every mapping is rendered in full.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(translations: &'t Tree) -> Self {
        let mut worklist = Vec::new();
        collect_mappings(translations, &mut worklist);
        let fingerprints: Vec<u64> = worklist.iter().map(|tree| fingerprint(tree)).collect();

        let mut plan = Self::default();

        for (position, &candidate) in worklist.iter().enumerate() {
            if plan.anchor_for(candidate, fingerprints[position]).is_some() {
                continue;
            }

            let id = plan.anchors.len() + 1;
            let mut anchor_worthy = false;

            for (offset, &later) in worklist[position + 1..].iter().enumerate() {
                if identical(candidate, later) {
                    anchor_worthy = true;
                    continue;
                }
                if let Some(ratio) = near_superset_ratio(candidate, later) {
                    let later_fingerprint = fingerprints[position + 1 + offset];
                    if plan.record_merge(id, candidate, later, later_fingerprint, ratio) {
                        anchor_worthy = true;
                    }
                }
            }

            if anchor_worthy {
                plan.anchor_index
                    .entry(fingerprints[position])
                    .or_default()
                    .push(plan.anchors.len());
                plan.anchors.push(candidate);
            }
        }

        debug!(
            "Planned {} YAML anchors and {} merges over {} nested mappings",
            plan.anchors.len(),
            plan.merges.values().map(Vec::len).sum::<usize>(),
            worklist.len()
        );

        plan
    }

    /// Records `target` as `<<: *id` plus a diff, unless an earlier
    /// candidate has a ratio that is smaller or equal.
    fn record_merge(
        &mut self,
        id: usize,
        anchor: &Tree,
        target: &'t Tree,
        target_fingerprint: u64,
        ratio: (usize, usize),
    ) -> bool {
        let candidates = self.merges.entry(target_fingerprint).or_default();
        let existing = candidates.iter().position(|merge| identical(merge.target, target));

        if let Some(index) = existing {
            let (diff, total) = ratio;
            let (best_diff, best_total) = candidates[index].ratio;
            if diff * best_total >= best_diff * total {
                return false;
            }
        }

        let merge = Merge {
            anchor: id,
            diff: diff_entries(anchor, target),
            target,
            ratio,
        };
        match existing {
            Some(index) => candidates[index] = merge,
            None => candidates.push(merge),
        }
        true
    }

    /// The anchor identifier of a mapping identical to `tree`, if any.
    pub fn anchor_for(&self, tree: &Tree, fingerprint: u64) -> Option<usize> {
        self.anchor_index
            .get(&fingerprint)?
            .iter()
            .find(|&&index| identical(self.anchors[index], tree))
            .map(|index| index + 1)
    }

    /// The merge directive planned for a mapping identical to `tree`, if any.
    pub fn merge_for(&self, tree: &Tree, fingerprint: u64) -> Option<&Merge<'t>> {
        self.merges
            .get(&fingerprint)?
            .iter()
            .find(|merge| identical(merge.target, tree))
    }

    /// Planned anchor identifiers in planning order.
    pub fn anchor_ids(&self) -> impl Iterator<Item = usize> + '_ {
        1..=self.anchors.len()
    }
}

/// Every nested mapping, parents before their children.
fn collect_mappings<'t>(tree: &'t Tree, worklist: &mut Vec<&'t Tree>) {
    for node in tree.values() {
        if let Node::Mapping(child) = node {
            worklist.push(child);
            collect_mappings(child, worklist);
        }
    }
}

fn same_node(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Scalar(x), Node::Scalar(y)) => x == y,
        (Node::Mapping(x), Node::Mapping(y)) => identical(x, y),
        _ => false,
    }
}

/// Entries of `target` that `anchor` does not hold identically.
fn diff_entries(anchor: &Tree, target: &Tree) -> Tree {
    target
        .iter()
        .filter(|(key, node)| !anchor.get(key.as_str()).is_some_and(|other| same_node(other, node)))
        .map(|(key, node)| (key.clone(), node.clone()))
        .collect()
}

/// The diff ratio of `target` against `anchor` when it lies in (0, 0.5]
/// and `target` holds every key of `anchor`.
fn near_superset_ratio(anchor: &Tree, target: &Tree) -> Option<(usize, usize)> {
    if target.len() < anchor.len() || !anchor.keys().all(|key| target.contains_key(key)) {
        return None;
    }

    let differing = target
        .iter()
        .filter(|(key, node)| !anchor.get(key.as_str()).is_some_and(|other| same_node(other, node)))
        .count();

    (differing > 0 && differing * 2 <= target.len()).then_some((differing, target.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(entries: &[(&str, Node)]) -> Tree {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn flat(entries: &[(&str, &str)]) -> Node {
        Node::Mapping(entries.iter().map(|(k, v)| (k.to_string(), Node::from(*v))).collect())
    }

    #[test]
    fn fingerprint_is_order_sensitive() {
        let a = tree(&[("k1", "v1".into()), ("k2", "v2".into())]);
        let b = tree(&[("k2", "v2".into()), ("k1", "v1".into())]);
        assert_eq!(a, b);
        assert_ne!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
    }

    #[test]
    fn identical_mappings_share_an_anchor() {
        let t = tree(&[("x", flat(&[("k", "v")])), ("y", flat(&[("k", "v")]))]);
        let plan = AnchorPlan::build(&t);
        let x = t["x"].as_mapping().unwrap();
        assert_eq!(plan.anchor_for(x, fingerprint(x)), Some(1));
        assert_eq!(plan.anchor_ids().count(), 1);
    }

    #[test]
    fn near_superset_gets_a_merge() {
        let t = tree(&[
            ("x", flat(&[("k1", "v1"), ("k2", "v2")])),
            ("y", flat(&[("k1", "v1"), ("k2", "v2"), ("k3", "v3")])),
        ]);
        let plan = AnchorPlan::build(&t);
        let y = t["y"].as_mapping().unwrap();
        let merge = plan.merge_for(y, fingerprint(y)).unwrap();
        assert_eq!(merge.anchor, 1);
        assert_eq!(merge.diff.keys().collect::<Vec<_>>(), ["k3"]);
        assert_eq!(merge.ratio, (1, 3));
    }

    #[test]
    fn missing_keys_or_large_diffs_prevent_merges() {
        let t = tree(&[
            ("x", flat(&[("k1", "v1"), ("k2", "v2")])),
            ("y", flat(&[("k1", "v1"), ("k3", "v3"), ("k4", "v4")])),
            ("z", flat(&[("k1", "other"), ("k2", "other")])),
        ]);
        let plan = AnchorPlan::build(&t);
        assert_eq!(plan.anchor_ids().count(), 0);
    }

    #[test]
    fn ties_keep_the_earlier_candidate() {
        let t = tree(&[
            ("a", flat(&[("k1", "v1"), ("k2", "v2")])),
            ("b", flat(&[("k1", "v1"), ("k3", "v3")])),
            ("c", flat(&[("k1", "v1"), ("k2", "v2"), ("k3", "v3"), ("k4", "v4")])),
        ]);
        let plan = AnchorPlan::build(&t);
        let c = t["c"].as_mapping().unwrap();
        let merge = plan.merge_for(c, fingerprint(c)).unwrap();
        assert_eq!(merge.anchor, 1);
        assert_eq!(plan.anchor_ids().count(), 1);
    }

    #[test]
    fn smaller_ratio_replaces_the_candidate() {
        let t = tree(&[
            ("a", flat(&[("k1", "v1"), ("k2", "v2")])),
            ("b", flat(&[("k1", "v1"), ("k2", "v2"), ("k3", "v3")])),
            ("c", flat(&[("k1", "v1"), ("k2", "v2"), ("k3", "v3"), ("k4", "v4")])),
        ]);
        let plan = AnchorPlan::build(&t);
        let c = t["c"].as_mapping().unwrap();
        let merge = plan.merge_for(c, fingerprint(c)).unwrap();
        assert_eq!(merge.anchor, 2);
        assert_eq!(merge.ratio, (1, 4));
    }

    #[test]
    fn scalar_only_trees_plan_nothing() {
        let t = tree(&[("a", "1".into()), ("b", flat(&[("a", "1")]))]);
        let plan = AnchorPlan::build(&t);
        assert_eq!(plan.anchor_ids().count(), 0);
    }
}
