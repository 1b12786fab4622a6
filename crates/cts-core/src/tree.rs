//! A tree of data keyed by the query hierarchy.
//!
//! Each level of a query maps to one node: the suite, then one node per file
//! segment, one per test segment, and a single node for the whole cases string.
//! Children are kept in a `BTreeMap` so that every traversal visits them in
//! `(name, target)` order, which keeps generated output deterministic.
//!
//! Data is held only by the terminal node of an inserted query, except after
//! [`Tree::reduce`], which replaces mergeable children with a synthetic `*`
//! child holding the merged data.

use std::collections::BTreeMap;
use std::fmt;

use crate::query::{Query, Target};
use crate::{Error, Result};

const WILDCARD: &str = "*";

/// Key of a child node: the level's name and target.
///
/// `Ord` is derived, so siblings sort by name first, then by target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeNodeChildKey {
    pub name: String,
    pub target: Target,
}

impl TreeNodeChildKey {
    pub fn new(name: impl Into<String>, target: Target) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

pub type TreeNodeChildren<D> = BTreeMap<TreeNodeChildKey, TreeNode<D>>;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<D> {
    /// The query addressing this node.
    pub query: Query,
    pub data: Option<D>,
    pub children: TreeNodeChildren<D>,
}

/// A query paired with the data stored for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryData<D> {
    pub query: Query,
    pub data: D,
}

impl<D> TreeNode<D> {
    fn new(query: Query) -> Self {
        Self {
            query,
            data: None,
            children: BTreeMap::new(),
        }
    }

    fn get_or_create_child(&mut self, key: TreeNodeChildKey, query: Query) -> &mut TreeNode<D> {
        self.children
            .entry(key)
            .or_insert_with(|| TreeNode::new(query))
    }

    /// Appends this node and all its descendants that hold data, pre-order.
    fn traverse<'a>(&'a self, out: &mut Vec<QueryData<&'a D>>) {
        if let Some(data) = &self.data {
            out.push(QueryData {
                query: self.query.clone(),
                data,
            });
        }
        for child in self.children.values() {
            child.traverse(out);
        }
    }
}

impl<D: Clone> TreeNode<D> {
    /// Merges the sub-tree bottom-up, returning the merged data for this node.
    ///
    /// Children are grouped by target. A group merges when every child in it
    /// merged and `f` accepts the list. A merged group is replaced by a single
    /// `*` child. The node itself merges only when every group merged.
    fn merge<F>(&mut self, f: &F) -> Option<D>
    where
        F: Fn(&[D]) -> Option<D>,
    {
        if self.children.is_empty() {
            return self.data.clone();
        }

        let mut groups: BTreeMap<Target, Option<Vec<D>>> = BTreeMap::new();
        for (key, child) in self.children.iter_mut() {
            let merged = child.merge(f);
            let group = groups.entry(key.target).or_insert_with(|| Some(Vec::new()));
            match merged {
                Some(data) => {
                    if let Some(list) = group {
                        list.push(data);
                    }
                }
                None => *group = None,
            }
        }

        let mut merged_all = Vec::with_capacity(groups.len());
        let mut all = true;
        for (target, list) in groups {
            let Some(data) = list.and_then(|list| merge_list(list, f)) else {
                all = false;
                continue;
            };
            self.children.retain(|key, _| key.target != target);
            let mut child = TreeNode::new(self.query.append(target, WILDCARD));
            child.data = Some(data.clone());
            self.children
                .insert(TreeNodeChildKey::new(WILDCARD, target), child);
            merged_all.push(data);
        }

        if all { merge_list(merged_all, f) } else { None }
    }
}

fn merge_list<D, F>(mut list: Vec<D>, f: &F) -> Option<D>
where
    F: Fn(&[D]) -> Option<D>,
{
    if list.len() == 1 {
        return list.pop();
    }
    f(&list)
}

/// A tree of `D` keyed by query.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<D> {
    root: TreeNode<D>,
}

impl<D> Default for Tree<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Tree<D> {
    pub fn new() -> Self {
        Self {
            root: TreeNode::new(Query::default()),
        }
    }

    /// The root node. Its children are the suites.
    pub fn root(&self) -> &TreeNode<D> {
        &self.root
    }

    fn get_or_create_node(&mut self, query: &Query) -> &mut TreeNode<D> {
        let mut node = &mut self.root;
        for level in query.levels() {
            node = node.get_or_create_child(TreeNodeChildKey::new(level.name, level.target), level.query);
        }
        node
    }

    /// Inserts `data` at `query`, creating intermediate nodes as needed.
    pub fn add(&mut self, query: Query, data: D) -> Result<()> {
        let node = self.get_or_create_node(&query);
        if node.data.is_some() {
            return Err(Error::DuplicateData { query });
        }
        node.data = Some(data);
        Ok(())
    }

    /// Inserts `data` at `query`, displacing summaries along the path.
    ///
    /// Every ancestor on the path loses its data, and the `*` sibling at each
    /// level of the path is removed.
    pub fn split(&mut self, query: Query, data: D) {
        let mut node = &mut self.root;
        for level in query.levels() {
            node.data = None;
            node.children
                .remove(&TreeNodeChildKey::new(WILDCARD, level.target));
            node = node.get_or_create_child(TreeNodeChildKey::new(level.name, level.target), level.query);
        }
        node.data = Some(data);
    }

    /// Returns the data at `query`, creating it with `create` if absent.
    pub fn get_or_create(&mut self, query: Query, create: impl FnOnce() -> D) -> &mut D {
        self.get_or_create_node(&query).data.get_or_insert_with(create)
    }

    /// Returns every data-holding node matched by `query`.
    ///
    /// - A `*` level matches every child of that level's target.
    /// - A cases level matches every cases child that `query` contains.
    /// - Otherwise the addressed node and all of its descendants are returned.
    ///
    /// Fails with [`Error::NoDataForQuery`] if a concrete level doesn't exist.
    pub fn glob(&self, query: &Query) -> Result<Vec<QueryData<&D>>> {
        let mut out = Vec::new();
        let mut node = &self.root;
        for level in query.levels() {
            if level.name == WILDCARD {
                for (key, child) in &node.children {
                    if key.target == level.target {
                        child.traverse(&mut out);
                    }
                }
                return Ok(out);
            }
            if level.target == Target::Cases {
                for (key, child) in &node.children {
                    if key.target == Target::Cases && query.contains(&child.query) {
                        child.traverse(&mut out);
                    }
                }
                return Ok(out);
            }
            match node
                .children
                .get(&TreeNodeChildKey::new(level.name, level.target))
            {
                Some(child) => node = child,
                None => return Err(Error::NoDataForQuery { query: level.query }),
            }
        }
        node.traverse(&mut out);
        Ok(out)
    }

    /// Replaces everything contained by `what` with a single node holding `with`.
    pub fn replace(&mut self, what: &Query, with: D) -> Result<()> {
        let mut levels = what.levels();
        let Some(last) = levels.pop() else {
            return Ok(());
        };

        let mut node = &mut self.root;
        for level in levels {
            match node
                .children
                .get_mut(&TreeNodeChildKey::new(level.name, level.target))
            {
                Some(child) => node = child,
                None => return Err(Error::NoDataForQuery { query: level.query }),
            }
        }

        node.children.retain(|_, child| !what.contains(&child.query));
        let child = node.get_or_create_child(TreeNodeChildKey::new(last.name, last.target), last.query);
        child.data = Some(with);
        Ok(())
    }

    /// All data-holding nodes, pre-order.
    pub fn list(&self) -> Vec<QueryData<&D>> {
        let mut out = Vec::new();
        self.root.traverse(&mut out);
        out
    }
}

impl<D: Clone> Tree<D> {
    /// Merges every suite sub-tree bottom-up with `f`.
    ///
    /// `f` receives the data of sibling nodes sharing a target and returns the
    /// merged data, or `None` if the siblings can't be merged.
    pub fn reduce<F>(&mut self, f: F)
    where
        F: Fn(&[D]) -> Option<D>,
    {
        for suite in self.root.children.values_mut() {
            suite.merge(&f);
        }
    }

    /// Like [`Tree::reduce`], restricted to the sub-tree addressed by `to`.
    pub fn reduce_under<F>(&mut self, to: &Query, f: F) -> Result<()>
    where
        F: Fn(&[D]) -> Option<D>,
    {
        let mut node = &mut self.root;
        for level in to.levels() {
            if level.name == WILDCARD {
                node.merge(&f);
                return Ok(());
            }
            match node
                .children
                .get_mut(&TreeNodeChildKey::new(level.name, level.target))
            {
                Some(child) => node = child,
                None => return Err(Error::NoDataForQuery { query: level.query }),
            }
        }
        node.merge(&f);
        Ok(())
    }
}

impl<D: fmt::Display> fmt::Display for Tree<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn node<D: fmt::Display>(
            n: &TreeNode<D>,
            depth: usize,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            for (key, child) in &n.children {
                write!(f, "{:indent$}{} ({})", "", key.name, key.target, indent = depth * 2)?;
                if let Some(data) = &child.data {
                    write!(f, " = {data}")?;
                }
                writeln!(f)?;
                node(child, depth + 1, f)?;
            }
            Ok(())
        }
        node(&self.root, 0, f)
    }
}
