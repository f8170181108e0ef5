//! The union-consistency oracle and the agglomerative learner built on top
//! of [`ktestable-core`]'s descriptor algebra.

pub mod learner;
pub mod oracle;
pub mod provenance;

pub use learner::{learn, learn_cancellable};
pub use oracle::{consistent, is_union_consistent, OracleMethod};
#[cfg(feature = "graph-oracle")]
pub use oracle::is_union_consistent_graph;
pub use provenance::Provenance;

pub use ktestable_core::{Descriptor, Error};
