use std::fmt::{self, Debug};

use smallvec::SmallVec;

use crate::node::{Decl, EnodeStore};
use crate::{Id, TableId};

/// An interned string.
///
/// This is provided by the [`symbol_table`](https://crates.io/crates/symbol_table)
/// crate. A `Symbol` is a wrapper around an integer, so it is cheap to copy,
/// compare, and hash; the global intern cache leaks the strings, which is
/// fine for symbol names.
pub use symbol_table::GlobalSymbol as Symbol;

/// An uninterpreted function symbol: an interned name, an arity, and a
/// commutativity flag.
///
/// Declarations compare by value, so `FuncDecl::new("f", 1)` built twice is
/// the same declaration, while `f/1` and `f/2` are distinct.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncDecl {
    name: Symbol,
    arity: u32,
    commutative: bool,
}

impl FuncDecl {
    /// A declaration for `name` applied to `arity` arguments.
    pub fn new(name: impl Into<Symbol>, arity: usize) -> Self {
        FuncDecl {
            name: name.into(),
            arity: arity as u32,
            commutative: false,
        }
    }

    /// Marks this (binary) declaration commutative.
    pub fn commutative(mut self) -> Self {
        debug_assert_eq!(self.arity, 2, "only binary symbols can be commutative");
        self.commutative = true;
        self
    }

    /// The declaration's name.
    pub fn name(&self) -> Symbol {
        self.name
    }
}

impl Decl for FuncDecl {
    fn arity(&self) -> usize {
        self.arity as usize
    }

    fn is_commutative(&self) -> bool {
        self.commutative
    }
}

impl Debug for FuncDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

const NO_TABLE: u32 = u32::MAX;

#[derive(Debug, Clone)]
struct NodeData {
    decl: FuncDecl,
    args: SmallVec<[Id; 4]>,
    table_id: u32,
}

/// A minimal e-node store: an arena of applied terms plus a union-find over
/// their classes.
///
/// `TermPool` is the reference implementation of [`EnodeStore`]. It is what
/// the doctests and the test suite run against, and a reasonable starting
/// point for embedding a [`CongruenceTable`](crate::CongruenceTable) before
/// an engine grows its own node representation. Nodes are not hash-consed:
/// every [`atom`](TermPool::atom) or [`app`](TermPool::app) call makes a
/// fresh node in a fresh class.
#[derive(Debug, Clone, Default)]
pub struct TermPool {
    nodes: Vec<NodeData>,
    parents: Vec<Id>,
}

impl TermPool {
    /// Makes a constant: a fresh application of the nullary symbol `name`.
    pub fn atom(&mut self, name: impl Into<Symbol>) -> Id {
        self.push(FuncDecl::new(name, 0), SmallVec::new())
    }

    /// Makes a fresh application of `decl` to `args`.
    ///
    /// Symbols of arity three or more may be applied to extra arguments,
    /// which accommodates flattened associative symbols.
    pub fn app(&mut self, decl: FuncDecl, args: &[Id]) -> Id {
        debug_assert!(
            decl.arity() == args.len() || (decl.arity() >= 3 && args.len() >= decl.arity()),
            "wrong number of arguments for {decl:?}"
        );
        self.push(decl, args.iter().copied().collect())
    }

    fn push(&mut self, decl: FuncDecl, args: SmallVec<[Id; 4]>) -> Id {
        let id = Id::from(self.nodes.len());
        self.nodes.push(NodeData {
            decl,
            args,
            table_id: NO_TABLE,
        });
        self.parents.push(id);
        id
    }

    /// Merges the classes of `id1` and `id2`, making `id1`'s root the
    /// representative of both. Returns that root.
    pub fn union(&mut self, id1: Id, id2: Id) -> Id {
        let root1 = self.find(id1);
        let root2 = self.find(id2);
        if root1 != root2 {
            self.parents[usize::from(root2)] = root1;
        }
        root1
    }

    /// Clears every node's sub-table stamp.
    ///
    /// Call this when resetting a
    /// [`CongruenceTable`](crate::CongruenceTable) without also discarding
    /// the pool, so surviving nodes can be re-stamped by their next
    /// insertion.
    pub fn clear_table_ids(&mut self) {
        for node in &mut self.nodes {
            node.table_id = NO_TABLE;
        }
    }

    /// The number of nodes in the pool.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the pool holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, n: Id) -> &NodeData {
        self.nodes
            .get(usize::from(n))
            .unwrap_or_else(|| panic!("Invalid id {}", n))
    }

    fn node_mut(&mut self, n: Id) -> &mut NodeData {
        self.nodes
            .get_mut(usize::from(n))
            .unwrap_or_else(|| panic!("Invalid id {}", n))
    }
}

impl EnodeStore for TermPool {
    type Decl = FuncDecl;

    fn decl(&self, n: Id) -> FuncDecl {
        self.node(n).decl
    }

    fn args(&self, n: Id) -> &[Id] {
        &self.node(n).args
    }

    fn find(&self, id: Id) -> Id {
        let mut current = id;
        loop {
            let parent = self.parents[usize::from(current)];
            if parent == current {
                return current;
            }
            current = parent;
        }
    }

    fn table_id(&self, n: Id) -> Option<TableId> {
        let tid = self.node(n).table_id;
        (tid != NO_TABLE).then(|| TableId::from(tid as usize))
    }

    fn set_table_id(&mut self, n: Id, tid: TableId) {
        debug_assert_eq!(self.node(n).table_id, NO_TABLE, "stamp set twice for {n}");
        self.node_mut(n).table_id = usize::from(tid) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_find() {
        let mut pool = TermPool::default();
        let atoms: Vec<Id> = (0..10).map(|i| pool.atom(format!("a{i}"))).collect();

        // everyone starts out alone
        for &a in &atoms {
            assert_eq!(pool.find(a), a);
        }

        pool.union(atoms[0], atoms[1]);
        pool.union(atoms[0], atoms[2]);
        pool.union(atoms[6], atoms[7]);
        pool.union(atoms[6], atoms[8]);

        assert_eq!(pool.find(atoms[2]), atoms[0]);
        assert_eq!(pool.find(atoms[8]), atoms[6]);
        assert_ne!(pool.find(atoms[0]), pool.find(atoms[6]));
        assert_eq!(pool.find(atoms[5]), atoms[5]);

        // unioning two members merges their roots
        pool.union(atoms[2], atoms[8]);
        assert_eq!(pool.find(atoms[7]), atoms[0]);
    }

    #[test]
    fn decl_identity() {
        assert_eq!(FuncDecl::new("f", 1), FuncDecl::new("f", 1));
        assert_ne!(FuncDecl::new("f", 1), FuncDecl::new("f", 2));
        assert_ne!(
            FuncDecl::new("h", 2),
            FuncDecl::new("h", 2).commutative()
        );
    }
}
