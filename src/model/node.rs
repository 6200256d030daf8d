//! Triple objects

use std::hash::{Hash, Hasher};

use crate::iri::Iri;

use super::{Literal, Resource};

/// Anything usable as the object of a triple.
///
/// `Resource` owns an embedded resource; `Iri` refers to a resource by
/// identifier only. Non-literal objects compare by identifier, so an
/// embedded resource and a reference to it are the same object.
#[derive(Debug, Clone)]
pub enum Node {
    Resource(Resource),
    Literal(Literal),
    Iri(Iri),
}

impl Node {
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Node::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// Identifier of a resource or reference object
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Node::Resource(r) => Some(r.id()),
            Node::Iri(iri) => Some(iri),
            Node::Literal(_) => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    /// An owned blank-node resource
    pub fn is_embedded(&self) -> bool {
        matches!(self, Node::Resource(r) if r.is_embedded())
    }

    /// The owned resource in this slot. Any other object is replaced by a
    /// new resource named `id` first.
    pub(crate) fn resource_or_insert(&mut self, id: &Iri) -> &mut Resource {
        match self {
            Node::Resource(resource) => resource,
            _ => {
                *self = Node::Resource(Resource::new(id.clone()));
                self.resource_or_insert(id)
            }
        }
    }

    /// The same object with any owned resource replaced by its identifier
    pub fn to_reference(&self) -> Node {
        match self {
            Node::Resource(r) => Node::Iri(r.id().clone()),
            other => other.clone(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Literal(a), Node::Literal(b)) => a == b,
            (Node::Literal(_), _) | (_, Node::Literal(_)) => false,
            _ => self.as_iri() == other.as_iri(),
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Node::Literal(l) => {
                0u8.hash(state);
                l.hash(state);
            }
            Node::Resource(r) => {
                1u8.hash(state);
                r.id().hash(state);
            }
            Node::Iri(iri) => {
                1u8.hash(state);
                iri.hash(state);
            }
        }
    }
}

impl From<Resource> for Node {
    fn from(resource: Resource) -> Self {
        Node::Resource(resource)
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        Node::Literal(literal)
    }
}

impl From<Iri> for Node {
    fn from(iri: Iri) -> Self {
        Node::Iri(iri)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Literal(Literal::plain(text))
    }
}
