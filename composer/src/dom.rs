//! A small retained node tree the composer and its engine render into.
//!
//! Each composer owns its container node and hands a child node to the
//! engine. Toolbar visibility is toggled on the toolbar node the engine
//! reports rather than by searching a global document, so several composers
//! can live in one tree without stepping on each other.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::rc::Weak;

/// Class applied to nodes that should not be drawn.
pub const HIDDEN_CLASS: &str = "hidden";

#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

struct NodeInner {
    kind: NodeKind,
    classes: RefCell<BTreeSet<String>>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<NodeInner>>,
}

enum NodeKind {
    Document,
    Element { tag: String },
}

impl Node {
    /// A root node. Anything appended beneath it is connected.
    pub fn document() -> Self {
        Self::with_kind(NodeKind::Document)
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Element { tag: tag.into() })
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                kind,
                classes: RefCell::new(BTreeSet::new()),
                children: RefCell::new(Vec::new()),
                parent: RefCell::new(Weak::new()),
            }),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.inner.kind {
            NodeKind::Document => None,
            NodeKind::Element { tag } => Some(tag),
        }
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Node { inner })
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// Appends `child` as the last child, detaching it from any previous
    /// parent first. Returns the appended node.
    pub fn append_child(&self, child: &Node) -> Node {
        child.detach();
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        self.inner.children.borrow_mut().push(child.clone());
        child.clone()
    }

    /// Inserts `child` before `reference`, or appends when `reference` is not
    /// a child of this node.
    pub fn insert_before(&self, child: &Node, reference: &Node) -> Node {
        child.detach();
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        let mut children = self.inner.children.borrow_mut();
        match children.iter().position(|c| c.ptr_eq(reference)) {
            Some(idx) => children.insert(idx, child.clone()),
            None => children.push(child.clone()),
        }
        child.clone()
    }

    pub fn remove_child(&self, child: &Node) -> bool {
        let mut children = self.inner.children.borrow_mut();
        let Some(idx) = children.iter().position(|c| c.ptr_eq(child)) else {
            return false;
        };
        let removed = children.remove(idx);
        *removed.inner.parent.borrow_mut() = Weak::new();
        true
    }

    /// Drops every child of this node.
    pub fn remove_children(&self) {
        let removed = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in removed {
            *child.inner.parent.borrow_mut() = Weak::new();
        }
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// True when the ancestor chain ends at a document node.
    pub fn is_connected(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if matches!(node.inner.kind, NodeKind::Document) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    pub fn add_class(&self, class: &str) {
        self.inner.classes.borrow_mut().insert(class.to_string());
    }

    pub fn remove_class(&self, class: &str) {
        self.inner.classes.borrow_mut().remove(class);
    }

    /// Flips `class` and returns whether it is now present.
    pub fn toggle_class(&self, class: &str) -> bool {
        let mut classes = self.inner.classes.borrow_mut();
        if classes.remove(class) {
            false
        } else {
            classes.insert(class.to_string());
            true
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.classes.borrow().contains(class)
    }

    pub fn is_hidden(&self) -> bool {
        self.has_class(HIDDEN_CLASS)
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("tag", &self.tag())
            .field("classes", &*self.inner.classes.borrow())
            .field("children", &self.child_count())
            .finish()
    }
}
