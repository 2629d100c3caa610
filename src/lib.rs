#![warn(missing_docs)]
/*!

`etable` provides the congruence table at the heart of a congruence closure
engine: an index over e-nodes that detects, in amortized constant time, when
two applications of the same function symbol have pairwise-equal argument
classes and are therefore congruent.

The table does not own the e-nodes, the union-find, or anything else about
the enclosing e-graph. It stores bare [`Id`]s and interprets them through an
[`EnodeStore`] borrowed at every operation, so argument classes may be merged
between operations without the table having to rehash anything. The engine is
expected to follow the usual protocol around a merge: erase the affected
parent nodes, commit the merge, then re-insert them and act on any congruence
the re-insertion reports.

Each function symbol gets its own sub-table, specialized by arity and
commutativity. For a binary commutative symbol the table additionally reports
whether a congruence was found only after swapping the two arguments, which
the engine typically needs when emitting explanations.

## Logging

`etable` dumps useful logging info using the [`log`](https://docs.rs/log/)
crate. The easiest way to see this info is to use the
[`env_logger`](https://docs.rs/env_logger/) crate in your binary or test.
The simplest way to enable `env_logger` is to put the following line near the
top of your `main`: `env_logger::init();`. Then, set the environment variable
`RUST_LOG=etable=trace`.

## Simple Example

```
use etable::{CongruenceTable, FuncDecl, TermPool};

let mut pool = TermPool::default();
let mut table = CongruenceTable::default();

let h = FuncDecl::new("h", 2).commutative();
let a = pool.atom("a");
let b = pool.atom("b");

let hab = pool.app(h, &[a, b]);
let hba = pool.app(h, &[b, a]);

assert_eq!(table.insert(&mut pool, hab), (hab, false));
// h(b, a) is congruent to h(a, b) because h is commutative
assert_eq!(table.insert(&mut pool, hba), (hab, true));
```

*/

mod etable;
mod node;
mod pool;
mod raw_set;
mod util;

pub use etable::CongruenceTable;
pub use node::{Decl, EnodeStore};
pub use pool::{FuncDecl, Symbol, TermPool};

/// A key to identify e-nodes tracked by a [`CongruenceTable`].
///
/// An `Id` names an e-node, not an e-class; which class a node belongs to is
/// the [`EnodeStore`]'s business and may change as the engine merges classes.
#[derive(Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Id(u32);

impl From<usize> for Id {
    fn from(n: usize) -> Id {
        Id(n as u32)
    }
}

impl From<Id> for usize {
    fn from(id: Id) -> usize {
        id.0 as usize
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a sub-table within a [`CongruenceTable`].
///
/// The table stamps one of these on each node the first time the node is
/// inserted (see [`EnodeStore::set_table_id`]), so that a node whose argument
/// classes have since been merged away is still routed to the same physical
/// sub-table when it is erased.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct TableId(u32);

impl From<usize> for TableId {
    fn from(n: usize) -> TableId {
        TableId(n as u32)
    }
}

impl From<TableId> for usize {
    fn from(tid: TableId) -> usize {
        tid.0 as usize
    }
}

impl std::fmt::Debug for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
