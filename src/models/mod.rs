// Concrete regressors that can be stored in a model artifact file.

pub mod linear;
pub mod tree;

pub use linear::{LinearModel, LinearTerm, TermEncoding};
pub use tree::{Aggregation, Node, Tree, TreeEnsemble};
