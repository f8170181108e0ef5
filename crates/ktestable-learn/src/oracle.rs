//! The union-consistency predicate: decides whether merging two descriptors
//! would let their languages "cross-contaminate" through shared factors.
//!
//! Two equivalent formulations are provided. [`is_union_consistent`] (the
//! de-facto, transitive-closure variant) is required and runs in time
//! linear in `|I_A ∪ I_B|`; it is what [`crate::learner::learn`] calls.
//! [`is_union_consistent_graph`] (behind the `graph-oracle` feature) is the
//! bipartite-reachability reference variant, kept only so the two can be
//! cross-checked against each other in tests.

use ktestable_core::error::Error;
use ktestable_core::math::{OrderedMap, OrderedSet};
use ktestable_core::Descriptor;
use owo_colors::OwoColorize;
use tracing::trace;

fn drop_first(s: &str) -> String {
    s.chars().skip(1).collect()
}

fn drop_last(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    chars.pop();
    chars.into_iter().collect()
}

fn difference(a: &OrderedSet<String>, b: &OrderedSet<String>) -> OrderedSet<String> {
    a.difference(b).cloned().collect()
}

fn intersection(a: &OrderedSet<String>, b: &OrderedSet<String>) -> OrderedSet<String> {
    a.intersection(b).cloned().collect()
}

/// Computes the set of white infixes reachable by starting at any seed in
/// `seeds` and following `u → inf` whenever `inf[..k-1] = u`, then
/// iteratively `inf → inf'` whenever `inf'[..k-1] = inf[1..]`. Each bucket
/// of `infixes` grouped by its head is consumed at most once, guaranteeing
/// work linear in `infixes.len()`.
fn closure(seeds: &OrderedSet<String>, infixes: &OrderedSet<String>) -> OrderedSet<String> {
    let mut by_head: OrderedMap<String, Vec<String>> = OrderedMap::new();
    for inf in infixes {
        by_head.entry(drop_last(inf)).or_default().push(inf.clone());
    }

    let mut worklist: Vec<String> = Vec::new();
    for seed in seeds {
        if let Some(bucket) = by_head.shift_remove(seed) {
            worklist.extend(bucket);
        }
    }

    let mut result = OrderedSet::new();
    while let Some(el) = worklist.pop() {
        let tail = drop_first(&el);
        result.insert(el);
        if let Some(bucket) = by_head.shift_remove(&tail) {
            worklist.extend(bucket);
        }
    }
    result
}

/// The required (de-facto) consistency check, built directly from the
/// reachable-strings computation rather than an explicit graph.
pub fn is_union_consistent(a: &Descriptor, b: &Descriptor) -> Result<bool, Error> {
    if a.k() != b.k() {
        return Err(Error::IncompatibleK {
            left: a.k(),
            right: b.k(),
        });
    }

    let red_infixes = difference(a.infixes(), b.infixes());
    let mut red_start = difference(a.prefixes(), b.prefixes());
    red_start.extend(red_infixes.iter().map(|inf| drop_first(inf)));
    let mut red_stop = difference(a.suffixes(), b.suffixes());
    red_stop.extend(red_infixes.iter().map(|inf| drop_last(inf)));

    let blue_infixes = difference(b.infixes(), a.infixes());
    let mut blue_start = difference(b.prefixes(), a.prefixes());
    blue_start.extend(blue_infixes.iter().map(|inf| drop_first(inf)));
    let mut blue_stop = difference(b.suffixes(), a.suffixes());
    blue_stop.extend(blue_infixes.iter().map(|inf| drop_last(inf)));

    if !blue_start.is_disjoint(&red_stop) || !red_start.is_disjoint(&blue_stop) {
        trace!(
            "{} and {} meet at a single factor boundary, rejecting merge",
            "red".red(),
            "blue".blue()
        );
        return Ok(false);
    }

    let white_infixes = intersection(a.infixes(), b.infixes());
    let de_facto_red = closure(&red_start, &white_infixes);
    let de_facto_blue = closure(&blue_start, &white_infixes);

    let red_end: OrderedSet<String> = de_facto_red.iter().map(|el| drop_first(el)).collect();
    let blue_end: OrderedSet<String> = de_facto_blue.iter().map(|el| drop_first(el)).collect();

    let consistent = red_end.is_disjoint(&blue_stop) && blue_end.is_disjoint(&red_stop);
    trace!(
        "de-facto consistency of {} vertices ({} reachable from {}, {} from {}): {consistent}",
        white_infixes.len(),
        de_facto_red.len(),
        "red".red(),
        de_facto_blue.len(),
        "blue".blue(),
    );
    Ok(consistent)
}

#[cfg(feature = "graph-oracle")]
mod graph {
    use super::*;
    use petgraph::graph::{DiGraph, NodeIndex};
    use petgraph::visit::Dfs;
    use std::collections::{HashMap, HashSet};

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Tagged {
        Prefix(String),
        Suffix(String),
        Infix(String),
    }

    /// Builds the bipartite factor graph of `a ∪ b`: nodes are tagged
    /// prefixes, tagged suffixes, and (untagged) infixes; edges follow the
    /// sliding-window overlap rules of the k-TSS factor algebra. The
    /// prefix→infix rule is stated here as a full `k-1` head match, matching how the
    /// de-facto variant seeds its closure (`inf[..k-1] ∈ seeds`) — the
    /// analogous rule for infix→infix and infix→suffix edges already uses a
    /// full `k-1` overlap, and the two formulations must agree for the
    /// required oracle-equivalence property to hold.
    fn build_graph(
        a: &Descriptor,
        b: &Descriptor,
    ) -> (DiGraph<Tagged, ()>, HashMap<Tagged, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        let mut node_id = |graph: &mut DiGraph<Tagged, ()>,
                            index: &mut HashMap<Tagged, NodeIndex>,
                            node: Tagged| -> NodeIndex {
            *index
                .entry(node.clone())
                .or_insert_with(|| graph.add_node(node))
        };

        let prefixes: OrderedSet<String> = union(a.prefixes(), b.prefixes());
        let suffixes: OrderedSet<String> = union(a.suffixes(), b.suffixes());
        let infixes: OrderedSet<String> = union(a.infixes(), b.infixes());

        for p in &prefixes {
            node_id(&mut graph, &mut index, Tagged::Prefix(p.clone()));
        }
        for s in &suffixes {
            node_id(&mut graph, &mut index, Tagged::Suffix(s.clone()));
        }
        for inf in &infixes {
            node_id(&mut graph, &mut index, Tagged::Infix(inf.clone()));
        }

        for p in &prefixes {
            let pn = node_id(&mut graph, &mut index, Tagged::Prefix(p.clone()));
            for inf in &infixes {
                let head: String = inf.chars().take(p.chars().count()).collect();
                if head == *p {
                    let infn = node_id(&mut graph, &mut index, Tagged::Infix(inf.clone()));
                    graph.add_edge(pn, infn, ());
                }
            }
        }
        for left in &infixes {
            let ln = node_id(&mut graph, &mut index, Tagged::Infix(left.clone()));
            let left_tail = drop_first(left);
            for right in &infixes {
                if drop_last(right) == left_tail {
                    let rn = node_id(&mut graph, &mut index, Tagged::Infix(right.clone()));
                    graph.add_edge(ln, rn, ());
                }
            }
            for s in &suffixes {
                if *s == left_tail {
                    let sn = node_id(&mut graph, &mut index, Tagged::Suffix(s.clone()));
                    graph.add_edge(ln, sn, ());
                }
            }
        }

        (graph, index)
    }

    fn union(a: &OrderedSet<String>, b: &OrderedSet<String>) -> OrderedSet<String> {
        a.union(b).cloned().collect()
    }

    fn reachable(graph: &DiGraph<Tagged, ()>, start: NodeIndex) -> HashSet<NodeIndex> {
        let mut dfs = Dfs::new(graph, start);
        let mut seen = HashSet::new();
        while let Some(n) = dfs.next(graph) {
            if n != start {
                seen.insert(n);
            }
        }
        seen
    }

    /// The reference graph/transitive-closure variant of the consistency
    /// check, gated behind the `graph-oracle` feature. Only used to
    /// cross-check [`super::is_union_consistent`] in tests; the learner
    /// never calls this directly.
    pub fn is_union_consistent_graph(a: &Descriptor, b: &Descriptor) -> Result<bool, Error> {
        if a.k() != b.k() {
            return Err(Error::IncompatibleK {
                left: a.k(),
                right: b.k(),
            });
        }

        let (graph, index) = build_graph(a, b);

        let mut red_nodes: Vec<NodeIndex> = Vec::new();
        for p in difference(a.prefixes(), b.prefixes()).iter() {
            red_nodes.push(index[&Tagged::Prefix(p.clone())]);
        }
        for s in difference(a.suffixes(), b.suffixes()).iter() {
            red_nodes.push(index[&Tagged::Suffix(s.clone())]);
        }
        for inf in difference(a.infixes(), b.infixes()).iter() {
            red_nodes.push(index[&Tagged::Infix(inf.clone())]);
        }

        let mut blue_nodes: Vec<NodeIndex> = Vec::new();
        for p in difference(b.prefixes(), a.prefixes()).iter() {
            blue_nodes.push(index[&Tagged::Prefix(p.clone())]);
        }
        for s in difference(b.suffixes(), a.suffixes()).iter() {
            blue_nodes.push(index[&Tagged::Suffix(s.clone())]);
        }
        for inf in difference(b.infixes(), a.infixes()).iter() {
            blue_nodes.push(index[&Tagged::Infix(inf.clone())]);
        }

        let blue_set: HashSet<NodeIndex> = blue_nodes.iter().cloned().collect();
        let red_set: HashSet<NodeIndex> = red_nodes.iter().cloned().collect();

        for r in &red_nodes {
            if reachable(&graph, *r).intersection(&blue_set).next().is_some() {
                return Ok(false);
            }
        }
        for b in &blue_nodes {
            if reachable(&graph, *b).intersection(&red_set).next().is_some() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(feature = "graph-oracle")]
pub use graph::is_union_consistent_graph;

/// Selects which oracle implementation the learner consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleMethod {
    /// The required, linear-time transitive-closure variant.
    DeFacto,
    /// The reference bipartite-graph variant (requires `graph-oracle`).
    #[cfg(feature = "graph-oracle")]
    Graph,
}

/// Dispatches to the oracle variant selected by `method`.
pub fn consistent(a: &Descriptor, b: &Descriptor, method: OracleMethod) -> Result<bool, Error> {
    match method {
        OracleMethod::DeFacto => is_union_consistent(a, b),
        #[cfg(feature = "graph-oracle")]
        OracleMethod::Graph => is_union_consistent_graph(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(w: &str, k: usize) -> Descriptor {
        Descriptor::from_example(w, k).unwrap()
    }

    // Self-consistency (property P5): consistent(A, A) is always true.
    #[test]
    fn self_consistent() {
        let a = d("abbbba", 3);
        assert!(is_union_consistent(&a, &a).unwrap());
    }

    // Scenario 1: z5 = z7 = ({ab},{ba},{abb,bbb,bba},∅), identical descriptors.
    #[test]
    fn identical_descriptors_are_consistent() {
        let z5 = d("abbba", 3);
        let z7 = d("abbba", 3);
        assert_eq!(z5.prefixes().iter().collect::<Vec<_>>(), vec!["ab"]);
        assert_eq!(z5.suffixes().iter().collect::<Vec<_>>(), vec!["ba"]);
        assert!(is_union_consistent(&z5, &z7).unwrap());
    }

    // Scenario 2: disjoint infix sets with reachable contamination.
    #[test]
    fn crossing_infixes_are_inconsistent() {
        let z3 = d("abcabc", 3);
        let z4 = d("cbacba", 3);
        assert!(!is_union_consistent(&z3, &z4).unwrap());
    }

    // Scenario 3: z3 vs z7 (= z5) are inconsistent.
    #[test]
    fn z3_vs_z7_inconsistent() {
        let z3 = d("abcabc", 3);
        let z7 = d("abbba", 3);
        assert!(!is_union_consistent(&z3, &z7).unwrap());
    }

    // Scenario 4: a string and a longer string that extends it are inconsistent.
    #[test]
    fn prefix_extension_is_inconsistent() {
        let a = d("baba", 3);
        let b = d("babababc", 3);
        assert!(!is_union_consistent(&a, &b).unwrap());
    }

    #[test]
    fn incompatible_k_errors() {
        let a = d("abba", 3);
        let b = d("abba", 2);
        assert!(matches!(
            is_union_consistent(&a, &b),
            Err(Error::IncompatibleK { left: 3, right: 2 })
        ));
    }
}

#[cfg(all(test, feature = "graph-oracle"))]
mod equivalence_tests {
    use super::*;

    fn d(w: &str, k: usize) -> Descriptor {
        Descriptor::from_example(w, k).unwrap()
    }

    // Property P4: the graph and de-facto variants must agree on every pair.
    #[test]
    fn oracle_variants_agree() {
        let examples = [
            "baba",
            "abba",
            "abcabc",
            "cbacba",
            "abbbba",
            "cbacbacba",
            "abbba",
            "babababc",
            "a",
            "ab",
            "",
        ];
        for w1 in examples.iter() {
            for w2 in examples.iter() {
                let a = d(w1, 3);
                let b = d(w2, 3);
                let de_facto = is_union_consistent(&a, &b).unwrap();
                let graph = is_union_consistent_graph(&a, &b).unwrap();
                assert_eq!(
                    de_facto, graph,
                    "oracle variants disagree on ({w1:?}, {w2:?}): de_facto={de_facto} graph={graph}"
                );
            }
        }
    }
}
