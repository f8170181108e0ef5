use crate::math::OrderedSet;

/// The four factor sets produced by [`extract_tuple`]: prefixes, suffixes,
/// infixes, and short strings, in that order.
pub type FactorTuple = (
    OrderedSet<String>,
    OrderedSet<String>,
    OrderedSet<String>,
    OrderedSet<String>,
);

/// Extracts the k-TSS factor tuple `(P, S, I, T)` of an example string `w`
/// for window size `k`. Pure, total, deterministic; never fails. `k` must be
/// at least 2, but this function does not itself validate that — an
/// ill-chosen `k` only becomes visible once the result is handed to
/// [`crate::descriptor::Descriptor::new`].
pub fn extract_tuple(w: &str, k: usize) -> FactorTuple {
    let chars: Vec<char> = w.chars().collect();
    let len = chars.len();

    let (prefixes, suffixes, shorts) = if k < 1 || len < k - 1 {
        let mut shorts = OrderedSet::new();
        shorts.insert(w.to_string());
        (OrderedSet::new(), OrderedSet::new(), shorts)
    } else {
        let prefix: String = chars[..k - 1].iter().collect();
        let suffix: String = chars[len - (k - 1)..].iter().collect();
        let mut prefixes = OrderedSet::new();
        prefixes.insert(prefix.clone());
        let mut suffixes = OrderedSet::new();
        suffixes.insert(suffix.clone());
        let shorts = if prefix == suffix {
            let mut s = OrderedSet::new();
            s.insert(prefix);
            s
        } else {
            OrderedSet::new()
        };
        (prefixes, suffixes, shorts)
    };

    let mut infixes = OrderedSet::new();
    if len >= k {
        for i in 0..=(len - k) {
            infixes.insert(chars[i..i + k].iter().collect());
        }
    }

    (prefixes, suffixes, infixes, shorts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_example() {
        let (p, s, i, t) = extract_tuple("a", 3);
        assert!(p.is_empty());
        assert!(s.is_empty());
        assert!(i.is_empty());
        assert_eq!(t, OrderedSet::from_iter(["a".to_string()]));
    }

    #[test]
    fn boundary_length_k_minus_one() {
        let (p, s, i, t) = extract_tuple("ab", 3);
        assert_eq!(p, OrderedSet::from_iter(["ab".to_string()]));
        assert_eq!(s, OrderedSet::from_iter(["ab".to_string()]));
        assert!(i.is_empty());
        assert_eq!(t, OrderedSet::from_iter(["ab".to_string()]));
    }

    #[test]
    fn longer_example() {
        let (p, s, i, t) = extract_tuple("abba", 3);
        assert_eq!(p, OrderedSet::from_iter(["ab".to_string()]));
        assert_eq!(s, OrderedSet::from_iter(["ba".to_string()]));
        assert_eq!(
            i,
            OrderedSet::from_iter(["abb".to_string(), "bba".to_string()])
        );
        assert!(t.is_empty());
    }

    #[test]
    fn empty_example() {
        let (p, s, i, t) = extract_tuple("", 3);
        assert!(p.is_empty());
        assert!(s.is_empty());
        assert!(i.is_empty());
        assert_eq!(t, OrderedSet::from_iter(["".to_string()]));
    }
}
