//! Named tree of game screens.
//!
//! Each node is a screen or dialog; the edge into a child carries the
//! action that performs the transition (click a button, press a key ...).
//! All nodes under one root share a single cursor, so [`InterfaceTree::current`]
//! answers the same from any node of the tree.

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{NavigatorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Transition into a node. Receives the caller's context, typically a
/// [`GameController`](crate::automation::context::GameController).
pub type TransitionAction<C> = Box<dyn FnMut(&mut C) -> Result<()>>;

struct InterfaceNode<C> {
    name: String,
    action: Option<TransitionAction<C>>,
    children: BTreeMap<String, NodeId>,
    parent: Option<NodeId>,
    /// Only read on roots.
    cursor: NodeId,
}

/// Arena of interface nodes. `NodeId`s are only meaningful for the tree
/// that issued them; passing a foreign id panics.
pub struct InterfaceTree<C> {
    nodes: Vec<InterfaceNode<C>>,
}

impl<C> Default for InterfaceTree<C> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<C> InterfaceTree<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new detached node; it is its own root and its own current node.
    pub fn create(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(InterfaceNode {
            name: name.into(),
            action: None,
            children: BTreeMap::new(),
            parent: None,
            cursor: id,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[node.0].children.get(name).copied()
    }

    /// Children ordered by name.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.values().copied().collect()
    }

    pub fn has_action(&self, node: NodeId) -> bool {
        self.nodes[node.0].action.is_some()
    }

    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut id = node;
        while let Some(parent) = self.nodes[id.0].parent {
            id = parent;
        }
        id
    }

    /// Names from the root down to `node`.
    pub fn path(&self, node: NodeId) -> Vec<&str> {
        let mut names = vec![self.name(node)];
        let mut id = node;
        while let Some(parent) = self.nodes[id.0].parent {
            names.push(self.name(parent));
            id = parent;
        }
        names.reverse();
        names
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut id = Some(node);
        while let Some(current) = id {
            if current == candidate {
                return true;
            }
            id = self.nodes[current.0].parent;
        }
        false
    }

    /// Register `child` under `parent`, entered by running `action`.
    ///
    /// On error the tree is unchanged.
    pub fn attach_child<F>(&mut self, parent: NodeId, child: NodeId, action: F) -> Result<()>
    where
        F: FnMut(&mut C) -> Result<()> + 'static,
    {
        self.attach(parent, child, Some(Box::new(action)))
    }

    /// Register `child` without a transition; entering it fails with
    /// `NoActionBound` until an action is bound.
    pub fn attach_unbound(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.attach(parent, child, None)
    }

    /// Replace the transition into an attached or detached node.
    pub fn bind_action<F>(&mut self, node: NodeId, action: F)
    where
        F: FnMut(&mut C) -> Result<()> + 'static,
    {
        self.nodes[node.0].action = Some(Box::new(action));
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, action: Option<TransitionAction<C>>) -> Result<()> {
        let child_name = self.nodes[child.0].name.clone();
        let parent_name = self.nodes[parent.0].name.clone();

        if self.nodes[child.0].parent.is_some() {
            return Err(NavigatorError::AlreadyAttached(child_name));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(NavigatorError::InvalidAttachment { parent: parent_name, child: child_name });
        }
        if self.nodes[parent.0].children.contains_key(&child_name) {
            log::error!("{:?} already has a sub-interface named {:?}", parent_name, child_name);
            return Err(NavigatorError::DuplicateName { parent: parent_name, name: child_name });
        }

        self.nodes[parent.0].children.insert(child_name, child);
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.action = action;
        Ok(())
    }

    /// The node the tree containing `node` is currently on.
    pub fn current(&self, node: NodeId) -> NodeId {
        self.nodes[self.root_of(node).0].cursor
    }

    /// Run the transition into `parent`'s child `name` and, if it succeeds,
    /// make that child current for the whole tree.
    pub fn enter_child(&mut self, parent: NodeId, name: &str, ctx: &mut C) -> Result<NodeId> {
        let child = self.child(parent, name).ok_or_else(|| {
            log::error!("{:?} has no sub-interface named {:?}", self.name(parent), name);
            NavigatorError::ChildNotFound { parent: self.name(parent).to_string(), name: name.to_string() }
        })?;

        let action = self.nodes[child.0]
            .action
            .as_mut()
            .ok_or_else(|| NavigatorError::NoActionBound(name.to_string()))?;
        action(ctx)?;

        let root = self.root_of(parent);
        self.nodes[root.0].cursor = child;
        log::info!("entered interface {}", self.path(child).join(" > "));
        Ok(child)
    }

    /// Reverse navigation has no defined semantics.
    pub fn back(&mut self, _node: NodeId, _ctx: &mut C) -> Result<NodeId> {
        Err(NavigatorError::Unsupported("back navigation is not defined for interface trees"))
    }
}

impl<C> fmt::Debug for InterfaceTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|n| (&n.name, n.parent, n.action.is_some())))
            .finish()
    }
}
