//! In-memory graph model
//!
//! A [`Graph`] holds top-level [`Resource`]s. Each resource owns its
//! outgoing statements as an ordered multimap from predicate to [`Node`];
//! blank-node objects are owned inline, everything else is referenced by
//! identifier. [`Triple`]s are produced on demand by unfolding that tree.

mod blank;
mod graph;
mod literal;
mod multimap;
mod node;
mod resource;
mod triple;

pub use blank::BlankNodeGenerator;
pub use graph::Graph;
pub use literal::{Literal, LiteralValue};
pub use multimap::MultiMap;
pub use node::Node;
pub use resource::{Resource, Triples};
pub use triple::Triple;
