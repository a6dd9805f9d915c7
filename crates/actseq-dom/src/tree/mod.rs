//! Arena-backed markup tree.
//!
//! Every entity of the document model is a thin view over an [`Element`]:
//! a handle made of a shared reference to the owning [`XmlTree`] and a node
//! index inside it. Nodes are never freed while the tree is alive, so a
//! detached element stays a valid (but document-less) handle.

mod writer;

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::DomConfig;
use crate::error::{DomError, DomResult};
use crate::params::ParameterResolver;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

const DOCUMENT_NODE_NAME: &str = "#document";

/// Process-unique identity of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(usize);

/// Character content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextContent {
    Plain(String),
    CData(String),
}

impl TextContent {
    pub fn as_str(&self) -> &str {
        match self {
            TextContent::Plain(s) | TextContent::CData(s) => s,
        }
    }

    pub fn is_cdata(&self) -> bool {
        matches!(self, TextContent::CData(_))
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    text: Option<TextContent>,
}

impl Node {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            text: None,
        }
    }
}

struct TreeData {
    id: TreeId,
    nodes: Vec<Node>,
    document: NodeId,
    config: DomConfig,
    resolver: Option<Arc<dyn ParameterResolver>>,
}

impl TreeData {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, name: &str) -> NodeId {
        self.nodes.push(Node::new(name));
        NodeId(self.nodes.len() - 1)
    }

    fn unlink(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).parent else {
            return false;
        };
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
        true
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.node(c).parent;
        }
        false
    }

    fn copy_subtree(&self, id: NodeId, target: &mut TreeData) -> NodeId {
        let source = self.node(id);
        let copy = target.alloc(&source.name);
        target.node_mut(copy).attributes = source.attributes.clone();
        target.node_mut(copy).text = source.text.clone();
        for child in source.children.clone() {
            let child_copy = self.copy_subtree(child, target);
            target.node_mut(child_copy).parent = Some(copy);
            target.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    fn copy_subtree_local(&mut self, id: NodeId) -> NodeId {
        let source = self.node(id).clone();
        let copy = self.alloc(&source.name);
        self.node_mut(copy).attributes = source.attributes;
        self.node_mut(copy).text = source.text;
        for child in source.children {
            let child_copy = self.copy_subtree_local(child);
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }
}

/// Shared handle to a markup tree.
///
/// The arena only grows: detached nodes and the originals of elements
/// copied into another tree stay allocated until the last handle to the
/// tree is dropped, since views over them may still be alive and can be
/// reattached.
#[derive(Clone)]
pub struct XmlTree {
    inner: Rc<RefCell<TreeData>>,
}

impl XmlTree {
    /// Create a tree whose document holds a single root element.
    pub fn new(root_name: &str) -> Self {
        Self::with_config(root_name, DomConfig::default())
    }

    pub fn with_config(root_name: &str, config: DomConfig) -> Self {
        Self::root_with_config(root_name, config).tree
    }

    /// Create a tree and return its root element.
    pub fn root_with_config(root_name: &str, config: DomConfig) -> Element {
        let tree = Self::fragment_with_config(config);
        let root = {
            let mut data = tree.inner.borrow_mut();
            let root = data.alloc(root_name);
            let document = data.document;
            data.node_mut(root).parent = Some(document);
            data.node_mut(document).children.push(root);
            root
        };
        tree.element(root)
    }

    /// Create a tree with an empty document. Elements created in it stay
    /// detached until appended somewhere.
    pub fn fragment() -> Self {
        Self::fragment_with_config(DomConfig::default())
    }

    fn fragment_with_config(config: DomConfig) -> Self {
        let mut data = TreeData {
            id: TreeId::next(),
            nodes: Vec::new(),
            document: NodeId(0),
            config,
            resolver: None,
        };
        data.document = data.alloc(DOCUMENT_NODE_NAME);
        Self {
            inner: Rc::new(RefCell::new(data)),
        }
    }

    pub fn id(&self) -> TreeId {
        self.inner.borrow().id
    }

    pub fn ptr_eq(&self, other: &XmlTree) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The document root element, if the document has one.
    pub fn root(&self) -> Option<Element> {
        let data = self.inner.borrow();
        let root = data.node(data.document).children.first().copied();
        drop(data);
        root.map(|id| self.element(id))
    }

    /// Create a new, detached element in this tree.
    pub fn create_element(&self, name: &str) -> Element {
        let id = self.inner.borrow_mut().alloc(name);
        self.element(id)
    }

    pub fn config(&self) -> DomConfig {
        self.inner.borrow().config.clone()
    }

    pub fn set_config(&self, config: DomConfig) {
        self.inner.borrow_mut().config = config;
    }

    pub fn resolver(&self) -> Option<Arc<dyn ParameterResolver>> {
        self.inner.borrow().resolver.clone()
    }

    pub fn set_resolver(&self, resolver: Option<Arc<dyn ParameterResolver>>) {
        self.inner.borrow_mut().resolver = resolver;
    }

    /// Number of allocated nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    /// Render the whole document as XML text.
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        if let Some(root) = self.root() {
            out.push_str(&root.to_xml());
        }
        out
    }

    fn element(&self, id: NodeId) -> Element {
        Element {
            tree: self.clone(),
            id,
        }
    }
}

impl fmt::Debug for XmlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("XmlTree")
            .field("id", &data.id)
            .field("nodes", &data.nodes.len())
            .finish()
    }
}

/// Handle to one element of an [`XmlTree`].
///
/// Equality is node identity: two handles are equal when they point at the
/// same node of the same tree.
#[derive(Clone)]
pub struct Element {
    tree: XmlTree,
    id: NodeId,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.tree.ptr_eq(&other.tree) && self.id == other.id
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree.id().hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element(<{}> {}#{})", self.name(), self.tree.id(), self.id.0)
    }
}

impl Element {
    fn with_node<R>(&self, f: impl FnOnce(&Node) -> R) -> R {
        let data = self.tree.inner.borrow();
        f(data.node(self.id))
    }

    fn with_node_mut<R>(&self, f: impl FnOnce(&mut Node) -> R) -> R {
        let mut data = self.tree.inner.borrow_mut();
        f(data.node_mut(self.id))
    }

    fn wrap(&self, id: NodeId) -> Element {
        self.tree.element(id)
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    pub fn tree_id(&self) -> TreeId {
        self.tree.id()
    }

    pub fn name(&self) -> String {
        self.with_node(|n| n.name.clone())
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.with_node(|n| n.name == name)
    }

    pub fn set_name(&self, name: &str) {
        self.with_node_mut(|n| n.name = name.to_string());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.with_node(|n| {
            n.attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        })
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.with_node(|n| n.attributes.clone())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.with_node_mut(|n| {
            match n.attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => n.attributes.push((name.to_string(), value.to_string())),
            }
        });
    }

    pub fn remove_attribute(&self, name: &str) -> bool {
        self.with_node_mut(|n| {
            let before = n.attributes.len();
            n.attributes.retain(|(k, _)| k != name);
            before != n.attributes.len()
        })
    }

    /// Text content, or an empty string when there is none.
    pub fn text(&self) -> String {
        self.with_node(|n| {
            n.text
                .as_ref()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default()
        })
    }

    pub fn text_content(&self) -> Option<TextContent> {
        self.with_node(|n| n.text.clone())
    }

    pub fn is_cdata(&self) -> bool {
        self.with_node(|n| n.text.as_ref().map(TextContent::is_cdata).unwrap_or(false))
    }

    pub fn set_text(&self, value: &str) {
        self.with_node_mut(|n| n.text = Some(TextContent::Plain(value.to_string())));
    }

    pub fn set_cdata(&self, value: &str) {
        self.with_node_mut(|n| n.text = Some(TextContent::CData(value.to_string())));
    }

    pub fn clear_text(&self) {
        self.with_node_mut(|n| n.text = None);
    }

    /// Detach every child and drop the text content.
    pub fn clear_content(&self) {
        for child in self.children() {
            child.detach();
        }
        self.clear_text();
    }

    pub fn children(&self) -> Vec<Element> {
        let ids = self.with_node(|n| n.children.clone());
        ids.into_iter().map(|id| self.wrap(id)).collect()
    }

    pub fn child_count(&self) -> usize {
        self.with_node(|n| n.children.len())
    }

    pub fn has_children(&self) -> bool {
        self.child_count() > 0
    }

    pub fn child(&self, name: &str) -> Option<Element> {
        self.children().into_iter().find(|c| c.has_name(name))
    }

    pub fn children_named(&self, name: &str) -> Vec<Element> {
        self.children()
            .into_iter()
            .filter(|c| c.has_name(name))
            .collect()
    }

    /// Select elements along a relative path such as `a/b/*`.
    ///
    /// `*` matches any child, `.` is the current element and empty
    /// segments are ignored.
    pub fn select(&self, path: &str) -> Vec<Element> {
        let mut current = vec![self.clone()];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = match segment {
                "." => current,
                "*" => current.iter().flat_map(|e| e.children()).collect(),
                name => current
                    .iter()
                    .flat_map(|e| e.children_named(name))
                    .collect(),
            };
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn select_first(&self, path: &str) -> Option<Element> {
        self.select(path).into_iter().next()
    }

    /// Return the element at `path`, creating any missing element on the way.
    pub fn ensure_path(&self, path: &str) -> Element {
        let mut current = self.clone();
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            current = match current.child(segment) {
                Some(existing) => existing,
                None => current.add_child(segment),
            };
        }
        current
    }

    /// Append a freshly created child element.
    pub fn add_child(&self, name: &str) -> Element {
        let mut data = self.tree.inner.borrow_mut();
        let child = data.alloc(name);
        data.node_mut(child).parent = Some(self.id);
        data.node_mut(self.id).children.push(child);
        drop(data);
        self.wrap(child)
    }

    /// Insert a freshly created child element at `index` (clamped to the
    /// child count).
    pub fn insert_new_child(&self, index: usize, name: &str) -> Element {
        let mut data = self.tree.inner.borrow_mut();
        let child = data.alloc(name);
        data.node_mut(child).parent = Some(self.id);
        let children = &mut data.node_mut(self.id).children;
        let index = index.min(children.len());
        children.insert(index, child);
        drop(data);
        self.wrap(child)
    }

    /// Append `child` as the last child, detaching it from its current
    /// parent first. Elements of another tree are deep-copied in; the
    /// returned handle is the attached element.
    pub fn append(&self, child: &Element) -> DomResult<Element> {
        let len = self.child_count();
        self.insert(len, child)
    }

    /// Insert `child` at `index` (clamped to the child count).
    pub fn insert(&self, index: usize, child: &Element) -> DomResult<Element> {
        let child = if child.tree.ptr_eq(&self.tree) {
            child.clone()
        } else {
            child.import_into(&self.tree)
        };
        let mut data = self.tree.inner.borrow_mut();
        if data.is_ancestor_or_self(child.id, self.id) {
            return Err(DomError::CyclicInsertion(data.node(child.id).name.clone()));
        }
        data.unlink(child.id);
        let children = &mut data.node_mut(self.id).children;
        let index = index.min(children.len());
        children.insert(index, child.id);
        data.node_mut(child.id).parent = Some(self.id);
        drop(data);
        Ok(child)
    }

    /// Position among the parent's children.
    pub fn index_in_parent(&self) -> Option<usize> {
        let data = self.tree.inner.borrow();
        let parent = data.node(self.id).parent?;
        data.node(parent).children.iter().position(|c| *c == self.id)
    }

    /// The parent element. The document itself is not an element, so the
    /// root element has no parent.
    pub fn parent(&self) -> Option<Element> {
        let data = self.tree.inner.borrow();
        let parent = data.node(self.id).parent?;
        if parent == data.document {
            return None;
        }
        drop(data);
        Some(self.wrap(parent))
    }

    /// Remove this element from its parent. Returns false if it was not
    /// attached to anything.
    pub fn detach(&self) -> bool {
        self.tree.inner.borrow_mut().unlink(self.id)
    }

    pub fn is_root(&self) -> bool {
        let data = self.tree.inner.borrow();
        data.node(self.id).parent == Some(data.document)
    }

    /// Whether the element is reachable from the tree's document.
    pub fn is_attached(&self) -> bool {
        let data = self.tree.inner.borrow();
        data.is_ancestor_or_self(data.document, self.id)
    }

    /// The document root element, when this element is attached.
    pub fn root(&self) -> Option<Element> {
        if self.is_attached() {
            self.tree.root()
        } else {
            None
        }
    }

    /// Whether `other` is a strict ancestor of this element.
    pub fn is_descendant_of(&self, other: &Element) -> bool {
        if !self.tree.ptr_eq(&other.tree) || self.id == other.id {
            return false;
        }
        let data = self.tree.inner.borrow();
        data.is_ancestor_or_self(other.id, self.id)
    }

    /// Detached deep copy within the same tree.
    pub fn deep_copy(&self) -> Element {
        let id = self.tree.inner.borrow_mut().copy_subtree_local(self.id);
        self.wrap(id)
    }

    /// Detached deep copy inside another tree.
    pub fn import_into(&self, tree: &XmlTree) -> Element {
        if tree.ptr_eq(&self.tree) {
            return self.deep_copy();
        }
        let source = self.tree.inner.borrow();
        let mut target = tree.inner.borrow_mut();
        let id = source.copy_subtree(self.id, &mut target);
        drop(target);
        drop(source);
        tree.element(id)
    }

    /// Render this element and its subtree as XML text.
    pub fn to_xml(&self) -> String {
        let data = self.tree.inner.borrow();
        let mut out = String::new();
        writer::write_node(&data, self.id, 0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(elements: &[Element]) -> Vec<String> {
        elements.iter().map(Element::name).collect()
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let tree = XmlTree::new("root");
        let root = tree.root().unwrap();
        root.add_child("a");
        root.add_child("b");
        let c = tree.create_element("c");
        root.insert(1, &c).unwrap();

        assert_eq!(names(&root.children()), vec!["a", "c", "b"]);
        assert_eq!(c.index_in_parent(), Some(1));
        assert_eq!(c.parent(), Some(root.clone()));
        assert!(root.parent().is_none());
        assert!(root.is_root());
    }

    #[test]
    fn test_detach_and_reattach_keeps_identity() {
        let tree = XmlTree::new("root");
        let root = tree.root().unwrap();
        let a = root.add_child("a");
        let b = root.add_child("b");
        a.add_child("inner");

        assert!(a.detach());
        assert!(!a.is_attached());
        assert!(a.root().is_none());
        assert!(!a.detach());

        let attached = b.append(&a).unwrap();
        assert_eq!(attached, a);
        assert!(a.is_attached());
        assert_eq!(a.select("inner").len(), 1);
    }

    #[test]
    fn test_insert_rejects_cycles() {
        let tree = XmlTree::new("root");
        let root = tree.root().unwrap();
        let a = root.add_child("a");
        let b = a.add_child("b");

        assert!(matches!(b.append(&a), Err(DomError::CyclicInsertion(_))));
        assert!(matches!(a.append(&a), Err(DomError::CyclicInsertion(_))));
        assert_eq!(b.parent(), Some(a));
    }

    #[test]
    fn test_select_and_ensure_path() {
        let tree = XmlTree::new("root");
        let root = tree.root().unwrap();
        let leaf = root.ensure_path("a/b/c");
        leaf.set_text("value");
        root.ensure_path("a/b/d");

        assert_eq!(root.select_first("a/b/c").unwrap().text(), "value");
        assert_eq!(names(&root.select("a/b/*")), vec!["c", "d"]);
        assert_eq!(root.ensure_path("a/b/c"), leaf);
        assert!(root.select("a/x/c").is_empty());
        assert_eq!(root.select("."), vec![root.clone()]);
    }

    #[test]
    fn test_attributes_preserve_order() {
        let tree = XmlTree::new("root");
        let root = tree.root().unwrap();
        root.set_attribute("type", "string");
        root.set_attribute("mapping", "x");
        root.set_attribute("type", "integer");

        assert_eq!(
            root.attributes(),
            vec![
                ("type".to_string(), "integer".to_string()),
                ("mapping".to_string(), "x".to_string())
            ]
        );
        assert!(root.remove_attribute("mapping"));
        assert!(!root.remove_attribute("mapping"));
        assert_eq!(root.attribute("mapping"), None);
    }

    #[test]
    fn test_import_copies_across_trees() {
        let source = XmlTree::fragment();
        let node = source.create_element("action");
        node.add_child("name").set_cdata("x < y");

        let target = XmlTree::new("root");
        let root = target.root().unwrap();
        let attached = root.append(&node).unwrap();

        assert_ne!(attached, node);
        assert_eq!(attached.tree_id(), target.id());
        assert_eq!(attached.select_first("name").unwrap().text(), "x < y");
        assert!(attached.select_first("name").unwrap().is_cdata());
        assert!(!node.is_attached());
    }

    #[test]
    fn test_detached_nodes_stay_allocated() {
        let tree = XmlTree::new("root");
        let root = tree.root().unwrap();
        let a = root.add_child("a");
        let before = tree.node_count();

        a.detach();
        assert_eq!(tree.node_count(), before);
        assert_eq!(a.name(), "a");

        let other = XmlTree::new("other");
        other.root().unwrap().append(&a).unwrap();
        assert_eq!(tree.node_count(), before);
        assert_eq!(other.node_count(), 3);

        root.insert_new_child(0, "first");
        assert_eq!(names(&root.children()), vec!["first"]);
        assert_eq!(tree.node_count(), before + 1);
    }

    #[test]
    fn test_tree_ids_are_unique() {
        let a = XmlTree::new("root");
        let b = XmlTree::new("root");
        assert_ne!(a.id(), b.id());
        assert!(a.ptr_eq(&a.clone()));
    }
}
