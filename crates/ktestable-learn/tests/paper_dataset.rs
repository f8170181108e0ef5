use ktestable_learn::{learn, OracleMethod};

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test_log::test]
fn paper_dataset_clusters_match_expected_shape() {
    let examples = words(&[
        "baba",
        "abba",
        "abcabc",
        "cbacba",
        "abbbba",
        "cbacbacba",
        "abbba",
        "babababc",
    ]);

    let clusters = learn(&examples, 3, OracleMethod::DeFacto).unwrap();
    assert_eq!(clusters.len(), 4);

    // every original example belongs to exactly one cluster
    let mut seen: Vec<usize> = clusters.iter().flat_map(|(_, p)| p.leaves()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..examples.len()).collect::<Vec<_>>());
}

#[cfg(feature = "graph-oracle")]
#[test_log::test]
fn paper_dataset_clusters_match_under_graph_oracle() {
    let examples = words(&[
        "baba",
        "abba",
        "abcabc",
        "cbacba",
        "abbbba",
        "cbacbacba",
        "abbba",
        "babababc",
    ]);

    let de_facto = learn(&examples, 3, OracleMethod::DeFacto).unwrap();
    let graph = learn(&examples, 3, OracleMethod::Graph).unwrap();

    let mut de_facto_clusters: Vec<Vec<usize>> =
        de_facto.iter().map(|(_, p)| p.leaves()).collect();
    let mut graph_clusters: Vec<Vec<usize>> = graph.iter().map(|(_, p)| p.leaves()).collect();
    de_facto_clusters.sort();
    graph_clusters.sort();
    assert_eq!(de_facto_clusters, graph_clusters);
}
