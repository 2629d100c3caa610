use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

use crate::node::{Decl, EnodeStore};
use crate::raw_set::{Insertion, KeyEq, RawSet};
use crate::util::{hash_one, hasher, HashMap};
use crate::{Id, TableId};

/// The specialization a sub-table uses for its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKind {
    Unary,
    Binary,
    BinaryComm,
    Nary,
}

impl TableKind {
    fn of(d: &impl Decl) -> Self {
        match (d.arity(), d.is_commutative()) {
            (1, _) => TableKind::Unary,
            (2, true) => TableKind::BinaryComm,
            (2, false) => TableKind::Binary,
            _ => TableKind::Nary,
        }
    }
}

fn class_hash<N: EnodeStore>(nodes: &N, id: Id) -> u64 {
    hash_one(nodes.find(id))
}

fn unary_hash<N: EnodeStore>(nodes: &N, n: Id) -> u64 {
    debug_assert_eq!(nodes.args(n).len(), 1);
    class_hash(nodes, nodes.args(n)[0])
}

fn unary_eq<N: EnodeStore>(nodes: &N, n1: Id, n2: Id) -> KeyEq {
    debug_assert_eq!(nodes.args(n1).len(), 1);
    debug_assert_eq!(nodes.args(n2).len(), 1);
    if nodes.find(nodes.args(n1)[0]) == nodes.find(nodes.args(n2)[0]) {
        KeyEq::Equal
    } else {
        KeyEq::Distinct
    }
}

fn binary_roots<N: EnodeStore>(nodes: &N, n: Id) -> (Id, Id) {
    let args = nodes.args(n);
    debug_assert_eq!(args.len(), 2);
    (nodes.find(args[0]), nodes.find(args[1]))
}

fn binary_hash<N: EnodeStore>(nodes: &N, n: Id) -> u64 {
    hash_one(binary_roots(nodes, n))
}

fn binary_eq<N: EnodeStore>(nodes: &N, n1: Id, n2: Id) -> KeyEq {
    if binary_roots(nodes, n1) == binary_roots(nodes, n2) {
        KeyEq::Equal
    } else {
        KeyEq::Distinct
    }
}

// Order-invariant key for commutative symbols: the root pair is sorted
// before hashing, so f(a, b) and f(b, a) land in the same bucket.
fn comm_hash<N: EnodeStore>(nodes: &N, n: Id) -> u64 {
    let (r1, r2) = binary_roots(nodes, n);
    hash_one((r1.min(r2), r1.max(r2)))
}

fn comm_eq<N: EnodeStore>(nodes: &N, n1: Id, n2: Id) -> KeyEq {
    let (a1, a2) = binary_roots(nodes, n1);
    let (b1, b2) = binary_roots(nodes, n2);
    if (a1, a2) == (b1, b2) {
        KeyEq::Equal
    } else if (a1, a2) == (b2, b1) {
        KeyEq::EqualSwapped
    } else {
        KeyEq::Distinct
    }
}

fn nary_hash<N: EnodeStore>(nodes: &N, n: Id) -> u64 {
    let mut hasher = hasher();
    for &arg in nodes.args(n) {
        nodes.find(arg).hash(&mut hasher);
    }
    hasher.finish()
}

fn nary_eq<N: EnodeStore>(nodes: &N, n1: Id, n2: Id) -> KeyEq {
    let (args1, args2) = (nodes.args(n1), nodes.args(n2));
    let pointwise = args1.len() == args2.len()
        && args1
            .iter()
            .zip(args2)
            .all(|(&a, &b)| nodes.find(a) == nodes.find(b));
    if pointwise {
        KeyEq::Equal
    } else {
        KeyEq::Distinct
    }
}

struct SubTable<D> {
    decl: D,
    kind: TableKind,
    set: RawSet<Id>,
}

impl<D: Decl> SubTable<D> {
    fn new(decl: D, kind: TableKind) -> Self {
        SubTable {
            decl,
            kind,
            set: Default::default(),
        }
    }

    fn insert<N: EnodeStore<Decl = D>>(&mut self, nodes: &N, n: Id) -> Insertion<Id> {
        debug_assert_eq!(self.decl, nodes.decl(n));
        let set = &mut self.set;
        match self.kind {
            TableKind::Unary => set.insert_if_absent(
                n,
                |&k| unary_hash(nodes, k),
                |&a, &b| unary_eq(nodes, a, b),
            ),
            TableKind::Binary => set.insert_if_absent(
                n,
                |&k| binary_hash(nodes, k),
                |&a, &b| binary_eq(nodes, a, b),
            ),
            TableKind::BinaryComm => set.insert_if_absent(
                n,
                |&k| comm_hash(nodes, k),
                |&a, &b| comm_eq(nodes, a, b),
            ),
            TableKind::Nary => set.insert_if_absent(
                n,
                |&k| nary_hash(nodes, k),
                |&a, &b| nary_eq(nodes, a, b),
            ),
        }
    }

    fn find<N: EnodeStore<Decl = D>>(&self, nodes: &N, n: Id) -> Option<Id> {
        debug_assert_eq!(self.decl, nodes.decl(n));
        let set = &self.set;
        match self.kind {
            TableKind::Unary => set.find(
                &n,
                |&k| unary_hash(nodes, k),
                |&a, &b| unary_eq(nodes, a, b),
            ),
            TableKind::Binary => set.find(
                &n,
                |&k| binary_hash(nodes, k),
                |&a, &b| binary_eq(nodes, a, b),
            ),
            TableKind::BinaryComm => {
                set.find(&n, |&k| comm_hash(nodes, k), |&a, &b| comm_eq(nodes, a, b))
            }
            TableKind::Nary => {
                set.find(&n, |&k| nary_hash(nodes, k), |&a, &b| nary_eq(nodes, a, b))
            }
        }
    }

    fn contains<N: EnodeStore<Decl = D>>(&self, nodes: &N, n: Id) -> bool {
        debug_assert_eq!(self.decl, nodes.decl(n));
        let set = &self.set;
        match self.kind {
            TableKind::Unary => set.contains(
                &n,
                |&k| unary_hash(nodes, k),
                |&a, &b| unary_eq(nodes, a, b),
            ),
            TableKind::Binary => set.contains(
                &n,
                |&k| binary_hash(nodes, k),
                |&a, &b| binary_eq(nodes, a, b),
            ),
            TableKind::BinaryComm => {
                set.contains(&n, |&k| comm_hash(nodes, k), |&a, &b| comm_eq(nodes, a, b))
            }
            TableKind::Nary => {
                set.contains(&n, |&k| nary_hash(nodes, k), |&a, &b| nary_eq(nodes, a, b))
            }
        }
    }

    fn erase<N: EnodeStore<Decl = D>>(&mut self, nodes: &N, n: Id) -> bool {
        debug_assert_eq!(self.decl, nodes.decl(n));
        let set = &mut self.set;
        match self.kind {
            TableKind::Unary => set.erase(
                &n,
                |&k| unary_hash(nodes, k),
                |&a, &b| unary_eq(nodes, a, b),
            ),
            TableKind::Binary => set.erase(
                &n,
                |&k| binary_hash(nodes, k),
                |&a, &b| binary_eq(nodes, a, b),
            ),
            TableKind::BinaryComm => {
                set.erase(&n, |&k| comm_hash(nodes, k), |&a, &b| comm_eq(nodes, a, b))
            }
            TableKind::Nary => {
                set.erase(&n, |&k| nary_hash(nodes, k), |&a, &b| nary_eq(nodes, a, b))
            }
        }
    }
}

/** A congruence table: one hash set per function declaration, keyed by the
current equivalence classes of each node's arguments.

Two nodes are congruent when they apply the same declaration to
pairwise-equivalent arguments, modulo swapping for a binary commutative
declaration. The table keeps at most one representative per congruence class
per sub-table, so [`insert`](CongruenceTable::insert) doubles as the
congruence check: it either stores the node or hands back the representative
already filed under the same key.

The table never touches union-find state; it only reads roots through the
[`EnodeStore`] passed to each operation, and its only write to the store is
the table-id stamp on first insertion.

# Example

```
use etable::{CongruenceTable, FuncDecl, TermPool};

let mut pool = TermPool::default();
let mut table = CongruenceTable::default();

let f = FuncDecl::new("f", 1);
let a = pool.atom("a");
let b = pool.atom("b");
let fa = pool.app(f, &[a]);
let fb = pool.app(f, &[b]);

assert_eq!(table.insert(&mut pool, fa), (fa, false));
// a and b are in different classes, so f(a) and f(b) are not congruent
assert_eq!(table.insert(&mut pool, fb), (fb, false));

// merge a and b, following the erase / merge / re-insert protocol
table.erase(&pool, fb);
pool.union(a, b);
let (existing, _) = table.insert(&mut pool, fb);
assert_eq!(existing, fa);
```
**/
pub struct CongruenceTable<D: Decl> {
    decl2table: HashMap<D, TableId>,
    tables: Vec<SubTable<D>>,
}

impl<D: Decl> Default for CongruenceTable<D> {
    fn default() -> Self {
        CongruenceTable {
            decl2table: Default::default(),
            tables: Default::default(),
        }
    }
}

impl<D: Decl> CongruenceTable<D> {
    /// The sub-table for declaration `d`, creating it on first sight.
    fn table_for(&mut self, d: D) -> TableId {
        let tables = &mut self.tables;
        *self.decl2table.entry(d).or_insert_with(|| {
            let kind = TableKind::of(&d);
            log::trace!("new {:?} sub-table for {:?}", kind, d);
            tables.push(SubTable::new(d, kind));
            TableId::from(tables.len() - 1)
        })
    }

    /// The sub-table `n` belongs to, if one exists. Never allocates or
    /// stamps anything, so stale stamps left behind by
    /// [`reset`](CongruenceTable::reset) resolve to `None`.
    fn lookup_table<N: EnodeStore<Decl = D>>(&self, nodes: &N, n: Id) -> Option<&SubTable<D>> {
        let tid = match nodes.table_id(n) {
            Some(tid) => tid,
            None => *self.decl2table.get(&nodes.decl(n))?,
        };
        self.tables.get(usize::from(tid))
    }

    /// Tries to insert `n`. If the table already holds a node `m` congruent
    /// to `n`, does nothing and returns `(m, used_commutativity)`; otherwise
    /// stores `n` and returns `(n, false)`.
    ///
    /// `used_commutativity` reports whether the congruence holds only after
    /// swapping `n`'s two arguments, which can happen for a binary
    /// commutative declaration.
    ///
    /// On the first insertion of a node this resolves the node's sub-table
    /// from its declaration (allocating the sub-table if the declaration has
    /// never been seen) and stamps the node with the sub-table's id; later
    /// operations route through the stamp even if the node's argument
    /// classes have been merged since.
    ///
    /// Nodes with no arguments must not be inserted; they are equal iff they
    /// are the same node, which the engine's interning layer already decides.
    pub fn insert<N: EnodeStore<Decl = D>>(&mut self, nodes: &mut N, n: Id) -> (Id, bool) {
        debug_assert!(!nodes.args(n).is_empty(), "insert of a nullary node {n}");
        let tid = match nodes.table_id(n) {
            Some(tid) => tid,
            None => {
                let tid = self.table_for(nodes.decl(n));
                nodes.set_table_id(n, tid);
                tid
            }
        };
        match self.tables[usize::from(tid)].insert(&*nodes, n) {
            Insertion::Inserted => (n, false),
            Insertion::Found { key, swapped } => {
                log::trace!("congruent: {n} ~ {key} (swapped: {swapped})");
                (key, swapped)
            }
        }
    }

    /// Removes the node congruent to `n`, if one is stored.
    ///
    /// `n` must have been inserted at some point, so that its sub-table
    /// stamp is set. Erasing a node that is not currently stored is a no-op.
    pub fn erase<N: EnodeStore<Decl = D>>(&mut self, nodes: &N, n: Id) {
        debug_assert!(!nodes.args(n).is_empty(), "erase of a nullary node {n}");
        let tid = match nodes.table_id(n) {
            Some(tid) => tid,
            None => {
                debug_assert!(false, "erase of a node that was never inserted: {n}");
                return;
            }
        };
        if let Some(table) = self.tables.get_mut(usize::from(tid)) {
            table.erase(nodes, n);
        }
    }

    /// The stored node congruent to `n`, if any.
    pub fn find<N: EnodeStore<Decl = D>>(&self, nodes: &N, n: Id) -> Option<Id> {
        debug_assert!(!nodes.args(n).is_empty(), "lookup of a nullary node {n}");
        self.lookup_table(nodes, n)?.find(nodes, n)
    }

    /// Whether some node congruent to `n` is stored.
    pub fn contains<N: EnodeStore<Decl = D>>(&self, nodes: &N, n: Id) -> bool {
        debug_assert!(!nodes.args(n).is_empty(), "lookup of a nullary node {n}");
        self.lookup_table(nodes, n)
            .map_or(false, |table| table.contains(nodes, n))
    }

    /// Whether `n` itself is the stored representative of its congruence
    /// class. Engines use this to tell whether a node is canonical or
    /// shadowed by a congruent sibling.
    pub fn contains_exact<N: EnodeStore<Decl = D>>(&self, nodes: &N, n: Id) -> bool {
        self.find(nodes, n) == Some(n)
    }

    /// The number of nodes stored across all sub-tables.
    pub fn len(&self) -> usize {
        self.tables.iter().map(|t| t.set.len()).sum()
    }

    /// Whether no nodes are stored.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.set.len() == 0)
    }

    /// The number of sub-tables, i.e. distinct declarations seen so far.
    pub fn num_subtables(&self) -> usize {
        self.tables.len()
    }

    /// Removes every stored node while keeping the sub-tables and the
    /// declaration map alive.
    ///
    /// Unlike [`reset`](CongruenceTable::reset) this leaves stamped table
    /// ids valid, so the engine may re-insert its nodes directly.
    pub fn clear(&mut self) {
        for table in &mut self.tables {
            table.set.clear();
        }
    }

    /// Drops every sub-table and forgets every declaration.
    ///
    /// Table-id stamps on live nodes become stale; the engine is expected to
    /// discard its nodes (or clear their stamps) alongside. Stale stamps make
    /// lookups report absence, but re-inserting a stale-stamped node is a
    /// contract violation.
    pub fn reset(&mut self) {
        self.decl2table.clear();
        self.tables.clear();
    }

    /// Returns a wrapper that implements [`Debug`] by dumping every
    /// sub-table, grouped by declaration, with each stored node's current
    /// argument roots. The format is for human eyes only.
    pub fn dump<'a, N: EnodeStore<Decl = D>>(&'a self, nodes: &'a N) -> impl Debug + 'a {
        CongruenceTableDump(self, nodes)
    }
}

impl<D: Decl> Debug for CongruenceTable<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for table in &self.tables {
            map.entry(&table.decl, &(table.kind, table.set.len()));
        }
        map.finish()
    }
}

struct CongruenceTableDump<'a, D: Decl, N>(&'a CongruenceTable<D>, &'a N);

impl<'a, D: Decl, N: EnodeStore<Decl = D>> Debug for CongruenceTableDump<'a, D, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.1;
        for table in &self.0.tables {
            writeln!(f, "{:?} ({:?}):", table.decl, table.kind)?;
            for &n in table.set.iter() {
                let roots: Vec<Id> = nodes.args(n).iter().map(|&a| nodes.find(a)).collect();
                writeln!(f, "  {}: args {:?} roots {:?}", n, nodes.args(n), roots)?;
            }
        }
        Ok(())
    }
}
