//! The agglomerative learner: owns the growing population of descriptors,
//! the alive/merged flags, the provenance trees, and the distance chain
//! that always surfaces the next merge candidate in ascending distance
//! order.

use itertools::Itertools;
use ktestable_core::error::Error;
use ktestable_core::Descriptor;
use tracing::{debug, trace};

use crate::oracle::{consistent, OracleMethod};
use crate::provenance::Provenance;

/// A single alive "source" index and its remaining candidate neighbours,
/// sorted ascending by `(dist, right)`.
#[derive(Debug, Clone)]
struct ChainRecord {
    left: usize,
    neighbours: Vec<(usize, usize)>,
}

impl ChainRecord {
    /// The `(dist, right, left)` sort key used to order the chain itself.
    fn key(&self) -> (usize, usize, usize) {
        let (dist, right) = self.neighbours[0];
        (dist, right, self.left)
    }
}

fn sort_chain(chain: &mut Vec<ChainRecord>) {
    chain.sort_by_key(|r| r.key());
}

fn neighbours_of(vectors: &[Descriptor], alive: &[bool], m: usize) -> Result<Vec<(usize, usize)>, Error> {
    let mut neighbours = Vec::new();
    for i in 0..m {
        if alive[i] {
            neighbours.push((vectors[m].distance(&vectors[i])?, i));
        }
    }
    neighbours.sort_unstable();
    Ok(neighbours)
}

/// Learns a k-TSS union over `examples` at window size `k`, returning one
/// `(Descriptor, Provenance)` pair per surviving cluster. Uses `method` to
/// decide merge consistency; both oracle variants are specified to produce
/// identical clustering on identical input.
pub fn learn(
    examples: &[String],
    k: usize,
    method: OracleMethod,
) -> Result<Vec<(Descriptor, Provenance)>, Error> {
    learn_cancellable(examples, k, method, None)
}

/// As [`learn`], but polls `cancellation` once per main-loop iteration; if
/// it returns `true` the loop stops and `Err(Error::Cancelled)` is returned,
/// carrying the number of merges completed so far. Off by default: `learn`
/// always passes `None`.
pub fn learn_cancellable(
    examples: &[String],
    k: usize,
    method: OracleMethod,
    cancellation: Option<&dyn Fn() -> bool>,
) -> Result<Vec<(Descriptor, Provenance)>, Error> {
    let n = examples.len();
    let mut vectors: Vec<Descriptor> = Vec::with_capacity(n);
    let mut alive: Vec<bool> = Vec::with_capacity(n);
    let mut provenance: Vec<Provenance> = Vec::with_capacity(n);

    for (i, example) in examples.iter().enumerate() {
        vectors.push(Descriptor::from_example(example, k)?);
        alive.push(true);
        provenance.push(Provenance::Leaf(i));
    }

    let mut chain: Vec<ChainRecord> = Vec::new();
    for left in 0..n.saturating_sub(1) {
        let mut neighbours = Vec::new();
        for right in (left + 1)..n {
            neighbours.push((vectors[left].distance(&vectors[right])?, right));
        }
        neighbours.sort_unstable();
        if !neighbours.is_empty() {
            chain.push(ChainRecord { left, neighbours });
        }
    }
    sort_chain(&mut chain);

    debug!("initialized distance chain with {} record(s)", chain.len());

    let mut merges = 0usize;

    loop {
        if chain.is_empty() {
            let clusters = alive
                .iter()
                .enumerate()
                .filter(|(_, &a)| a)
                .map(|(i, _)| (vectors[i].clone(), provenance[i].clone()))
                .collect_vec();
            debug!("chain exhausted, returning {} cluster(s)", clusters.len());
            return Ok(clusters);
        }

        if let Some(cancel) = cancellation {
            if cancel() {
                trace!("cancellation requested after {merges} merge(s)");
                return Err(Error::Cancelled { merges });
            }
        }

        let left = chain[0].left;
        let (dist, right) = chain[0].neighbours[0];

        if alive[right] && consistent(&vectors[left], &vectors[right], method)? {
            trace!("accepting merge of {left} and {right} at distance {dist}");
            merges += 1;

            let merged = vectors[left].union(&vectors[right])?;
            let merged_provenance =
                Provenance::merge(provenance[left].clone(), provenance[right].clone(), dist);
            let m = vectors.len();
            vectors.push(merged);
            provenance.push(merged_provenance);
            alive.push(true);
            alive[left] = false;
            alive[right] = false;

            chain.remove(0);
            if let Some(pos) = chain.iter().position(|r| r.left == right) {
                chain.remove(pos);
            }

            let neighbours = neighbours_of(&vectors, &alive, m)?;
            if !neighbours.is_empty() {
                chain.push(ChainRecord { left: m, neighbours });
            }
            sort_chain(&mut chain);
        } else {
            trace!("rejecting candidate ({left}, {right}) at distance {dist}");
            chain[0].neighbours.remove(0);
            if chain[0].neighbours.is_empty() {
                chain.remove(0);
            }
            sort_chain(&mut chain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        let result = learn(&[], 3, OracleMethod::DeFacto).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn single_example_is_its_own_cluster() {
        let result = learn(&examples(&["x"]), 3, OracleMethod::DeFacto).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].1.leaves(), vec![0]);
    }

    // Scenario 5, the "paper dataset": 8 examples cluster into exactly 4 groups.
    #[test]
    fn paper_dataset_clusters_into_four() {
        let words = examples(&[
            "baba",
            "abba",
            "abcabc",
            "cbacba",
            "abbbba",
            "cbacbacba",
            "abbba",
            "babababc",
        ]);
        let result = learn(&words, 3, OracleMethod::DeFacto).unwrap();
        assert_eq!(result.len(), 4);

        let mut all_leaves: Vec<usize> = result.iter().flat_map(|(_, p)| p.leaves()).collect();
        all_leaves.sort_unstable();
        assert_eq!(all_leaves, (0..8).collect::<Vec<_>>());
    }

    #[cfg(feature = "graph-oracle")]
    #[test]
    fn paper_dataset_agrees_across_oracle_methods() {
        let words = examples(&[
            "baba",
            "abba",
            "abcabc",
            "cbacba",
            "abbbba",
            "cbacbacba",
            "abbba",
            "babababc",
        ]);
        let de_facto = learn(&words, 3, OracleMethod::DeFacto).unwrap();
        let graph = learn(&words, 3, OracleMethod::Graph).unwrap();

        let mut de_facto_clusters: Vec<Vec<usize>> =
            de_facto.iter().map(|(_, p)| p.leaves()).collect();
        let mut graph_clusters: Vec<Vec<usize>> = graph.iter().map(|(_, p)| p.leaves()).collect();
        de_facto_clusters.sort();
        graph_clusters.sort();
        assert_eq!(de_facto_clusters, graph_clusters);
    }

    #[test]
    fn determinism() {
        let words = examples(&["baba", "abba", "abcabc", "cbacba", "abbbba"]);
        let first = learn(&words, 3, OracleMethod::DeFacto).unwrap();
        let second = learn(&words, 3, OracleMethod::DeFacto).unwrap();
        let leaves_of = |r: &[(Descriptor, Provenance)]| {
            let mut v: Vec<Vec<usize>> = r.iter().map(|(_, p)| p.leaves()).collect();
            v.sort();
            v
        };
        assert_eq!(leaves_of(&first), leaves_of(&second));
    }
}
