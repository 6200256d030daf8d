//! Top-level resource container

use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::iri::Iri;
use crate::namespace::NamespaceContext;
use crate::sink::{SinkError, TripleSink};

use super::resource::Path;
use super::{BlankNodeGenerator, Literal, Node, Resource, Triple};

/// An insertion-ordered set of top-level resources.
///
/// Blank nodes are adopted into the resource that first mentions them as an
/// object, so a flat triple stream rebuilds the nested tree. Every owned
/// descendant is indexed by the top-level resource holding it.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    resources: IndexMap<Iri, Resource>,
    /// embedded id -> top-level owner
    owners: FnvHashMap<Iri, Iri>,
    namespaces: NamespaceContext,
    blank_nodes: BlankNodeGenerator,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespaces(namespaces: NamespaceContext) -> Self {
        Graph {
            namespaces,
            ..Self::default()
        }
    }

    /// Share a blank node generator with other graphs or parsers
    pub fn with_blank_nodes(mut self, blank_nodes: BlankNodeGenerator) -> Self {
        self.blank_nodes = blank_nodes;
        self
    }

    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    pub fn namespaces_mut(&mut self) -> &mut NamespaceContext {
        &mut self.namespaces
    }

    pub fn blank_nodes(&self) -> &BlankNodeGenerator {
        &self.blank_nodes
    }

    fn position(&self, id: &Iri) -> Option<(Iri, Path)> {
        if self.resources.contains_key(id) {
            return Some((id.clone(), Vec::new()));
        }
        let top = self.owners.get(id)?;
        let path = self.resources.get(top)?.locate(id)?;
        Some((top.clone(), path))
    }

    /// Resource by identifier, top-level first, then owned descendants
    pub fn resource(&self, id: &Iri) -> Option<&Resource> {
        let (top, path) = self.position(id)?;
        self.resources.get(&top)?.descend(&path)
    }

    /// Mutable access by identifier. Resources attached below the returned
    /// one are found by [`Graph::resource`] only after [`Graph::reindex`].
    pub fn resource_mut(&mut self, id: &Iri) -> Option<&mut Resource> {
        let (top, path) = self.position(id)?;
        self.resources.get_mut(&top)?.descend_mut(&path)
    }

    /// Add or replace a top-level resource
    pub fn insert_resource(&mut self, resource: Resource) -> Option<Resource> {
        let top = resource.id().clone();
        let replaced = self.remove_resource(&top);
        self.index_subtree(&resource, &top);
        self.resources.insert(top, resource);
        replaced
    }

    /// Remove a top-level resource together with everything it owns
    pub fn remove_resource(&mut self, id: &Iri) -> Option<Resource> {
        let removed = self.resources.shift_remove(id)?;
        for owned in removed.subtree_ids() {
            if self.owners.get(&owned) == Some(id) {
                self.owners.remove(&owned);
            }
        }
        Some(removed)
    }

    /// Rebuild the descendant index after direct edits through `resource_mut`
    pub fn reindex(&mut self) {
        self.owners.clear();
        let mut owners = FnvHashMap::default();
        for (top, resource) in &self.resources {
            for owned in resource.subtree_ids().into_iter().skip(1) {
                owners.insert(owned, top.clone());
            }
        }
        self.owners = owners;
    }

    fn index_subtree(&mut self, resource: &Resource, top: &Iri) {
        for owned in resource.subtree_ids() {
            if &owned != top {
                self.owners.insert(owned, top.clone());
            }
        }
    }

    /// Place a statement in the resource tree.
    ///
    /// The subject is found among top-level resources and their descendants,
    /// or created top-level. A blank object that is neither owned already
    /// nor the subject or its top-level ancestor becomes an owned child of
    /// the subject, moving a top-level resource of that identifier if one
    /// exists. Every other identifier object stays a reference.
    pub fn add_triple(&mut self, triple: Triple) {
        let Triple {
            subject,
            predicate,
            object,
        } = triple;

        let top = match self.position(&subject) {
            Some((top, _)) => top,
            None => {
                self.resources
                    .insert(subject.clone(), Resource::new(subject.clone()));
                subject.clone()
            }
        };

        let object = self.adopt(&top, &subject, object);
        let adopted = object
            .as_resource()
            .map(Resource::subtree_ids)
            .unwrap_or_default();

        let fallback = match self.resources.get_mut(&top) {
            Some(owner) => owner.add_triple(Triple::new(subject, predicate, object)),
            None => Some({
                let mut resource = Resource::new(subject);
                resource.add(predicate, object);
                resource
            }),
        };

        match fallback {
            Some(resource) => {
                self.insert_resource(resource);
            }
            None => {
                for owned in adopted {
                    self.owners.insert(owned, top.clone());
                }
            }
        }
    }

    fn adopt(&mut self, top: &Iri, subject: &Iri, object: Node) -> Node {
        let Node::Iri(id) = object else {
            return object;
        };
        if !id.is_blank() || &id == subject || &id == top || self.owners.contains_key(&id) {
            return Node::Iri(id);
        }
        match self.resources.shift_remove(&id) {
            Some(moved) => Node::Resource(moved),
            None => Node::Resource(Resource::new(id)),
        }
    }

    /// Top-level resources in insertion order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Every live statement, resource by resource
    pub fn triples(&self) -> impl Iterator<Item = Triple> + '_ {
        self.resources.values().flat_map(Resource::triples)
    }

    /// Number of top-level resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn triple_count(&self) -> usize {
        self.triples().count()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl TripleSink for Graph {
    fn on_prefix(&mut self, prefix: &str, uri: &str) -> Result<(), SinkError> {
        self.namespaces.add_namespace(prefix, uri);
        Ok(())
    }

    fn add_non_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        object: &Iri,
        _graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        self.add_triple(Triple::new(subject.clone(), predicate.clone(), object.clone()));
        Ok(())
    }

    fn add_plain_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        language: Option<&str>,
        _graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        let literal = match language {
            Some(language) => Literal::with_language(text, language),
            None => Literal::plain(text),
        };
        self.add_triple(Triple::new(subject.clone(), predicate.clone(), literal));
        Ok(())
    }

    fn add_typed_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        datatype: &Iri,
        _graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        let literal = Literal::typed(text, datatype.clone());
        self.add_triple(Triple::new(subject.clone(), predicate.clone(), literal));
        Ok(())
    }
}
