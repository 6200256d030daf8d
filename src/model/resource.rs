//! Resources: identified subjects owning their outgoing statements

use indexmap::IndexMap;

use crate::iri::Iri;
use crate::namespace::ns::rdf;

use super::{BlankNodeGenerator, Literal, MultiMap, Node, Triple};

/// Position of a descendant: `(key index, value index)` per level
pub(crate) type Path = Vec<(usize, usize)>;

/// A subject and its attributes.
///
/// Attributes map predicates to objects in insertion order with duplicate
/// pairs suppressed. Objects that are themselves resources are owned here;
/// the `children` index only records under which predicate each one lives.
/// Ownership makes a resource containing itself impossible, and cyclic
/// data is expressed with identifier references ([`Node::Iri`]).
#[derive(Debug, Clone)]
pub struct Resource {
    id: Iri,
    attributes: MultiMap<Iri, Node>,
    /// child id -> predicate
    children: IndexMap<Iri, Iri>,
    deleted: bool,
}

impl Resource {
    pub fn new(id: Iri) -> Self {
        Resource {
            id,
            attributes: MultiMap::new(),
            children: IndexMap::new(),
            deleted: false,
        }
    }

    /// A blank-node resource with the next minted identifier
    pub fn anonymous(blank_nodes: &BlankNodeGenerator) -> Self {
        Resource::new(blank_nodes.next_iri())
    }

    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Blank-node resources are written inline with their parent
    pub fn is_embedded(&self) -> bool {
        self.id.is_blank()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Tombstone this resource. Its structure stays in place but it no
    /// longer contributes triples.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    /// Append `object` under `predicate`. Returns `false` for a duplicate pair.
    pub fn add(&mut self, predicate: Iri, object: impl Into<Node>) -> bool {
        let object = object.into();
        let child = object.as_resource().map(|r| r.id.clone());
        let added = self.attributes.put(predicate.clone(), object);
        if added {
            if let Some(child) = child {
                self.children.entry(child).or_insert(predicate);
            }
        }
        added
    }

    pub fn add_literal(&mut self, predicate: Iri, literal: impl Into<Literal>) -> bool {
        self.add(predicate, Node::Literal(literal.into()))
    }

    /// `rdf:type` shorthand
    pub fn a(&mut self, class: Iri) -> bool {
        self.add(rdf::type_(), class)
    }

    /// Attach a fresh anonymous resource under `predicate` and return it
    pub fn new_resource(&mut self, predicate: Iri, blank_nodes: &BlankNodeGenerator) -> &mut Resource {
        let child = Resource::anonymous(blank_nodes);
        let id = child.id.clone();
        self.children.insert(id.clone(), predicate.clone());
        self.attributes
            .push(predicate, Node::Resource(child))
            .resource_or_insert(&id)
    }

    /// Route a statement to this resource or the descendant it is about.
    ///
    /// When neither matches the subject, a new resource carrying the
    /// statement is returned for the caller to place; that only happens
    /// with an inconsistent triple stream.
    pub fn add_triple(&mut self, triple: Triple) -> Option<Resource> {
        let Triple {
            subject,
            predicate,
            object,
        } = triple;

        if let Some(path) = self.locate(&subject) {
            if let Some(target) = self.descend_mut(&path) {
                target.add(predicate, object);
                return None;
            }
        }

        tracing::warn!(
            subject = %subject,
            resource = %self.id,
            "statement subject is not part of this resource, synthesizing a new one"
        );
        let mut synthesized = Resource::new(subject);
        synthesized.add(predicate, object);
        Some(synthesized)
    }

    /// Objects under `predicate`
    pub fn objects(&self, predicate: &Iri) -> &[Node] {
        self.attributes.get(predicate)
    }

    /// Owned resources under `predicate`
    pub fn resources(&self, predicate: &Iri) -> impl Iterator<Item = &Resource> {
        self.objects(predicate).iter().filter_map(Node::as_resource)
    }

    pub fn literals(&self, predicate: &Iri) -> impl Iterator<Item = &Literal> {
        self.objects(predicate).iter().filter_map(Node::as_literal)
    }

    pub fn predicates(&self) -> impl Iterator<Item = &Iri> {
        self.attributes.keys()
    }

    /// `(predicate, object)` pairs in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&Iri, &Node)> {
        self.attributes.iter()
    }

    /// Directly owned resources, in attribute order
    pub fn children(&self) -> impl Iterator<Item = &Resource> {
        self.attributes.iter().filter_map(|(_, node)| node.as_resource())
    }

    /// Directly owned resource by identifier
    pub fn child(&self, id: &Iri) -> Option<&Resource> {
        let predicate = self.children.get(id)?;
        self.attributes.get(predicate).iter().find_map(|node| match node {
            Node::Resource(r) if &r.id == id => Some(r),
            _ => None,
        })
    }

    pub fn child_mut(&mut self, id: &Iri) -> Option<&mut Resource> {
        let predicate = self.children.get(id)?.clone();
        self.attributes
            .get_mut(&predicate)?
            .iter_mut()
            .find_map(|node| match node {
                Node::Resource(r) if &r.id == id => Some(r),
                _ => None,
            })
    }

    /// This resource or the owned descendant with identifier `id`
    pub fn find_resource(&self, id: &Iri) -> Option<&Resource> {
        let path = self.locate(id)?;
        self.descend(&path)
    }

    pub fn find_resource_mut(&mut self, id: &Iri) -> Option<&mut Resource> {
        let path = self.locate(id)?;
        self.descend_mut(&path)
    }

    /// Path from this resource to the descendant `id`, found with an
    /// explicit work-list rather than recursion.
    pub(crate) fn locate(&self, id: &Iri) -> Option<Path> {
        if &self.id == id {
            return Some(Vec::new());
        }
        if let Some(predicate) = self.children.get(id) {
            if let Some(step) = self.step_to(predicate, id) {
                return Some(vec![step]);
            }
        }

        // (resource, parent visit, step from parent)
        let mut visits: Vec<(&Resource, usize, (usize, usize))> = vec![(self, 0, (0, 0))];
        let mut pending = vec![0];
        while let Some(at) = pending.pop() {
            let resource = visits[at].0;
            for (key_index, (_, values)) in resource.attributes.groups().enumerate() {
                for (value_index, node) in values.iter().enumerate() {
                    let Node::Resource(child) = node else {
                        continue;
                    };
                    visits.push((child, at, (key_index, value_index)));
                    let visit = visits.len() - 1;
                    if &child.id == id {
                        let mut path = Vec::new();
                        let mut cursor = visit;
                        while cursor != 0 {
                            path.push(visits[cursor].2);
                            cursor = visits[cursor].1;
                        }
                        path.reverse();
                        return Some(path);
                    }
                    pending.push(visit);
                }
            }
        }
        None
    }

    fn step_to(&self, predicate: &Iri, id: &Iri) -> Option<(usize, usize)> {
        let key_index = self.attributes.keys().position(|k| k == predicate)?;
        let value_index = self.attributes.get(predicate).iter().position(|node| {
            matches!(node, Node::Resource(r) if &r.id == id)
        })?;
        Some((key_index, value_index))
    }

    pub(crate) fn descend(&self, path: &[(usize, usize)]) -> Option<&Resource> {
        let mut current = self;
        for &(key_index, value_index) in path {
            current = current.attributes.value_at(key_index, value_index)?.as_resource()?;
        }
        Some(current)
    }

    pub(crate) fn descend_mut(&mut self, path: &[(usize, usize)]) -> Option<&mut Resource> {
        let mut current = self;
        for &(key_index, value_index) in path {
            current = match current.attributes.value_at_mut(key_index, value_index)? {
                Node::Resource(child) => child,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Identifiers of this resource and every owned descendant
    pub(crate) fn subtree_ids(&self) -> Vec<Iri> {
        let mut ids = Vec::new();
        let mut pending = vec![self];
        while let Some(resource) = pending.pop() {
            ids.push(resource.id.clone());
            pending.extend(resource.children());
        }
        ids
    }

    /// Drop every object under `predicate`
    pub fn remove(&mut self, predicate: &Iri) -> Vec<Node> {
        let removed = self.attributes.remove(predicate).unwrap_or_default();
        self.reindex_children();
        removed
    }

    /// Drop one `(predicate, object)` pair
    pub fn remove_value(&mut self, predicate: &Iri, object: &Node) -> bool {
        let removed = self.attributes.remove_value(predicate, object).is_some();
        if removed {
            self.reindex_children();
        }
        removed
    }

    /// Move every object of `old` under `new`
    pub fn rename(&mut self, old: &Iri, new: Iri) -> bool {
        let renamed = self.attributes.rename_key(old, new);
        if renamed {
            self.reindex_children();
        }
        renamed
    }

    /// Collapse a lone blank-node object under `predicate`.
    ///
    /// When exactly one object under `predicate` is an embedded resource,
    /// that resource is removed and each of its own objects is added under
    /// `predicate` instead. Returns whether anything changed.
    pub fn compact_predicate(&mut self, predicate: &Iri) -> bool {
        let embedded: Vec<usize> = self
            .objects(predicate)
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_embedded())
            .map(|(i, _)| i)
            .collect();
        if embedded.len() != 1 {
            return false;
        }

        let Some(values) = self.attributes.get_mut(predicate) else {
            return false;
        };
        let Node::Resource(blank) = values.remove(embedded[0]) else {
            return false;
        };

        for object in blank.attributes.into_values() {
            self.add(predicate.clone(), object);
        }
        if self.attributes.get(predicate).is_empty() {
            self.attributes.remove(predicate);
        }
        self.reindex_children();
        true
    }

    fn reindex_children(&mut self) {
        self.children.clear();
        for (predicate, node) in self.attributes.iter() {
            if let Node::Resource(child) = node {
                self.children
                    .entry(child.id.clone())
                    .or_insert_with(|| predicate.clone());
            }
        }
    }

    /// Statements made directly by this resource
    pub fn properties(&self) -> Vec<Triple> {
        self.attributes
            .iter()
            .map(|(predicate, object)| {
                Triple::new(self.id.clone(), predicate.clone(), object.to_reference())
            })
            .collect()
    }

    /// Statements of this resource followed depth-first by those of each
    /// owned resource right after the statement that links it.
    ///
    /// Tombstoned resources are skipped together with their subtree.
    pub fn triples(&self) -> Triples<'_> {
        let mut stack = Vec::new();
        if !self.deleted {
            stack.push(self.frame());
        }
        Triples { stack }
    }

    fn frame(&self) -> Frame<'_> {
        (&self.id, Box::new(self.attributes.iter()))
    }

    /// First statement `predicate literal` found depth-first; a resource
    /// holding the match ends the search before its children are visited.
    pub fn find(&self, predicate: &Iri, literal: &Literal) -> Option<Triple> {
        let mut pending = vec![self];
        while let Some(resource) = pending.pop() {
            let found = resource
                .objects(predicate)
                .iter()
                .any(|node| matches!(node, Node::Literal(l) if l == literal));
            if found {
                return Some(Triple::new(
                    resource.id.clone(),
                    predicate.clone(),
                    literal.clone(),
                ));
            }
            let children: Vec<&Resource> = resource.children().collect();
            pending.extend(children.into_iter().rev());
        }
        None
    }

    /// Number of `(predicate, object)` pairs
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn clear(&mut self) {
        self.attributes.clear();
        self.children.clear();
    }
}

type Frame<'a> = (&'a Iri, Box<dyn Iterator<Item = (&'a Iri, &'a Node)> + 'a>);

/// Iterator returned by [`Resource::triples`]
pub struct Triples<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> Iterator for Triples<'a> {
    type Item = Triple;

    fn next(&mut self) -> Option<Triple> {
        loop {
            let (subject, pairs) = self.stack.last_mut()?;
            let Some((predicate, object)) = pairs.next() else {
                self.stack.pop();
                continue;
            };
            if let Node::Resource(child) = object {
                if child.deleted {
                    continue;
                }
            }
            let triple = Triple::new((*subject).clone(), predicate.clone(), object.to_reference());
            if let Node::Resource(child) = object {
                self.stack.push(child.frame());
            }
            return Some(triple);
        }
    }
}
