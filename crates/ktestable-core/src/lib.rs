//! Factor-tuple extraction and the k-testable-in-the-strict-sense (k-TSS)
//! descriptor algebra: the set-theoretic core that
//! [`ktestable-learn`](https://docs.rs/ktestable-learn) builds the
//! consistency oracle and the agglomerative learner on top of.

pub mod descriptor;
pub mod error;
pub mod extract;
pub mod math;

pub use descriptor::Descriptor;
pub use error::Error;
pub use extract::extract_tuple;
