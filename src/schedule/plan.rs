use crate::foundation::core::NodeId;
use crate::foundation::diagnostic::{Diagnostic, Severity};
use crate::foundation::error::{PatchError, PatchResult};
use crate::foundation::hash::StableHasher;
use crate::graph::Graph;
use crate::registry::NodeRegistry;
use crate::schedule::scc::{is_cyclic, tarjan_scc};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

/// A connection cut to break a cycle; its target reads the source's previous-frame value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackEdge {
    /// Index into [`Graph::connections`].
    pub connection: usize,
    pub from: NodeId,
    pub from_port: String,
    pub to: NodeId,
    pub to_port: String,
    /// The target has no buffer of its own; the delay is inserted by the evaluator.
    pub synthetic: bool,
}

/// Per-frame evaluation plan for one graph topology.
#[derive(Clone, Debug)]
pub struct Schedule {
    /// Nodes reachable backward from an output, in evaluation order.
    pub order: Vec<NodeId>,
    pub feedback: Vec<FeedbackEdge>,
    /// Nodes of components that could not be made acyclic; evaluated as passthrough.
    pub isolated: BTreeSet<NodeId>,
    /// Output-kind nodes, ascending.
    pub outputs: Vec<NodeId>,
    /// Topology digest this schedule was built from.
    pub topology: u64,
    pub diagnostics: Vec<Diagnostic>,
    feedback_set: HashSet<usize>,
}

impl Schedule {
    pub fn is_feedback(&self, connection: usize) -> bool {
        self.feedback_set.contains(&connection)
    }

    pub fn is_isolated(&self, id: NodeId) -> bool {
        self.isolated.contains(&id)
    }
}

/// Digest of everything that shapes a schedule: node ids and kinds, resolution state, and the
/// effective connections. Control and option values are not part of it.
pub fn topology_hash(graph: &Graph, registry: &NodeRegistry) -> u64 {
    let mut h = StableHasher::new();
    h.write_u64(graph.len() as u64);
    for n in graph.nodes() {
        h.write_u64(n.id.0);
        h.write_str(&n.kind);
        h.write_bool(n.is_known());
        h.write_bool(n.is_malformed());
        let desc = registry.describe(&n.kind);
        h.write_bool(desc.sink);
        h.write_bool(desc.delay_capable);
    }
    let eff = graph.effective_connections();
    h.write_u64(eff.len() as u64);
    for i in eff {
        let c = &graph.connections()[i];
        h.write_u64(i as u64);
        h.write_u64(c.from.0);
        h.write_str(&c.from_port);
        h.write_u64(c.to.0);
        h.write_str(&c.to_port);
    }
    h.finish64()
}

#[derive(Clone, Copy, Debug)]
struct Edge {
    src: usize,
    dst: usize,
    conn: usize,
}

/// Build the evaluation plan.
///
/// 1. Keep only nodes reachable backward from output nodes.
/// 2. Tarjan SCC; in every cyclic component pick feedback edges until it is acyclic, preferring
///    edges into delay-capable kinds, then back edges, then the shortest span.
/// 3. Kahn sort of the remainder with ascending node id as tie-break.
///
/// A component that is still cyclic after step 2 is isolated (its nodes run as passthrough)
/// and reported; only a failure after isolation aborts.
#[tracing::instrument(skip_all, fields(nodes = graph.len()))]
pub fn build_schedule(graph: &Graph, registry: &NodeRegistry) -> PatchResult<Schedule> {
    let ids: Vec<NodeId> = graph.nodes().map(|n| n.id).collect();
    let index: HashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let n = ids.len();

    let delay_capable: Vec<bool> = graph
        .nodes()
        .map(|node| node.is_known() && registry.describe(&node.kind).delay_capable)
        .collect();
    let outputs: Vec<NodeId> = graph
        .nodes()
        .filter(|node| node.is_known() && registry.describe(&node.kind).sink)
        .map(|node| node.id)
        .collect();

    let all_edges: Vec<Edge> = graph
        .effective_connections()
        .into_iter()
        .filter_map(|conn| {
            let c = &graph.connections()[conn];
            Some(Edge {
                src: *index.get(&c.from)?,
                dst: *index.get(&c.to)?,
                conn,
            })
        })
        .collect();

    let reachable = reachable_from(&outputs, &index, &all_edges, n);
    let edges: Vec<Edge> = all_edges
        .into_iter()
        .filter(|e| reachable[e.dst])
        .collect();

    let mut adj = vec![Vec::new(); n];
    for e in &edges {
        adj[e.src].push(e.dst);
    }

    let mut diagnostics = Vec::new();
    let mut cut: Vec<(usize, bool)> = Vec::new();
    let mut comps: Vec<Vec<usize>> = tarjan_scc(&adj)
        .into_iter()
        .filter(|c| reachable[c[0]] && is_cyclic(c, &adj))
        .collect();
    comps.sort_by_key(|c| ids[c[0]]);
    for comp in &comps {
        cut.extend(break_cycles(comp, &edges, &delay_capable, &ids));
    }

    let cut_set: HashSet<usize> = cut.iter().map(|(c, _)| *c).collect();
    let mut feedback = Vec::with_capacity(cut.len());
    for &(conn, synthetic) in &cut {
        let c = &graph.connections()[conn];
        tracing::debug!(connection = conn, from = %c.from, to = %c.to, synthetic, "feedback edge");
        if synthetic {
            diagnostics.push(
                Diagnostic::structural(format!(
                    "cycle through {} has no delay-capable node; one-frame delay inserted",
                    c.to
                ))
                .with_severity(Severity::Warning)
                .at_node(c.to)
                .at_connection(conn),
            );
        }
        feedback.push(FeedbackEdge {
            connection: conn,
            from: c.from,
            from_port: c.from_port.clone(),
            to: c.to,
            to_port: c.to_port.clone(),
            synthetic,
        });
    }
    feedback.sort_by_key(|f| f.connection);

    let mut dag: Vec<Edge> = edges
        .into_iter()
        .filter(|e| !cut_set.contains(&e.conn))
        .collect();
    let mut isolated = BTreeSet::new();

    let order = match kahn(&ids, &reachable, &dag) {
        Ok(order) => order,
        Err(stuck) => {
            isolated = isolate_stuck_cycles(&ids, &stuck, &mut dag, &mut diagnostics);
            kahn(&ids, &reachable, &dag).map_err(|_| {
                PatchError::schedule("graph stays cyclic after isolating unresolved components")
            })?
        }
    };

    for d in &diagnostics {
        d.log();
    }
    tracing::debug!(
        scheduled = order.len(),
        feedback = feedback.len(),
        isolated = isolated.len(),
        "schedule built"
    );

    Ok(Schedule {
        order,
        feedback_set: cut_set,
        feedback,
        isolated,
        outputs,
        topology: topology_hash(graph, registry),
        diagnostics,
    })
}

fn reachable_from(
    outputs: &[NodeId],
    index: &HashMap<NodeId, usize>,
    edges: &[Edge],
    n: usize,
) -> Vec<bool> {
    let mut rev = vec![Vec::new(); n];
    for e in edges {
        rev[e.dst].push(e.src);
    }
    let mut seen = vec![false; n];
    let mut queue: VecDeque<usize> = outputs.iter().filter_map(|id| index.get(id).copied()).collect();
    for &i in &queue {
        seen[i] = true;
    }
    while let Some(i) = queue.pop_front() {
        for &p in &rev[i] {
            if !seen[p] {
                seen[p] = true;
                queue.push_back(p);
            }
        }
    }
    seen
}

/// Choose feedback edges inside one cyclic component until no cycle remains.
///
/// Returns `(connection, synthetic)` pairs.
fn break_cycles(
    comp: &[usize],
    edges: &[Edge],
    delay_capable: &[bool],
    ids: &[NodeId],
) -> Vec<(usize, bool)> {
    let members: HashSet<usize> = comp.iter().copied().collect();
    let mut remaining: Vec<Edge> = edges
        .iter()
        .copied()
        .filter(|e| members.contains(&e.src) && members.contains(&e.dst))
        .collect();
    let mut chosen = Vec::new();

    loop {
        // Local re-indexing keeps the adjacency small for large graphs.
        let local: HashMap<usize, usize> = comp.iter().enumerate().map(|(l, &g)| (g, l)).collect();
        let mut adj = vec![Vec::new(); comp.len()];
        for e in &remaining {
            adj[local[&e.src]].push(local[&e.dst]);
        }
        let mut cyclic: Vec<Vec<usize>> = tarjan_scc(&adj)
            .into_iter()
            .filter(|c| is_cyclic(c, &adj))
            .map(|c| c.into_iter().map(|l| comp[l]).collect())
            .collect();
        if cyclic.is_empty() {
            return chosen;
        }
        cyclic.sort_by_key(|c: &Vec<usize>| ids[c[0]]);

        for sub in cyclic {
            let sub_set: HashSet<usize> = sub.iter().copied().collect();
            let rank = bfs_rank(&sub, &sub_set, edges, &remaining);
            let pick = remaining
                .iter()
                .enumerate()
                .filter(|(_, e)| sub_set.contains(&e.src) && sub_set.contains(&e.dst))
                .min_by_key(|(_, e)| {
                    let (rs, rd) = (rank[&e.src], rank[&e.dst]);
                    (
                        !delay_capable[e.dst],
                        rd > rs,
                        rs.abs_diff(rd),
                        ids[e.src],
                        ids[e.dst],
                        e.conn,
                    )
                })
                .map(|(i, e)| (i, *e));
            if let Some((i, e)) = pick {
                remaining.remove(i);
                chosen.push((e.conn, !delay_capable[e.dst]));
            }
        }
    }
}

/// BFS distance of every member from the component's entry: the lowest-id member fed from
/// outside the component, or the lowest-id member when nothing feeds it.
fn bfs_rank(
    sub: &[usize],
    sub_set: &HashSet<usize>,
    all_edges: &[Edge],
    remaining: &[Edge],
) -> HashMap<usize, usize> {
    let entry = sub
        .iter()
        .copied()
        .find(|m| {
            all_edges
                .iter()
                .any(|e| e.dst == *m && !sub_set.contains(&e.src))
        })
        .unwrap_or(sub[0]);

    let mut rank = HashMap::with_capacity(sub.len());
    rank.insert(entry, 0usize);
    let mut queue = VecDeque::from([entry]);
    while let Some(v) = queue.pop_front() {
        let r = rank[&v];
        for e in remaining.iter().filter(|e| e.src == v && sub_set.contains(&e.dst)) {
            rank.entry(e.dst).or_insert_with(|| {
                queue.push_back(e.dst);
                r + 1
            });
        }
    }
    // Members unreachable from the entry within the remaining edges sort last.
    for &m in sub {
        rank.entry(m).or_insert(usize::MAX / 2);
    }
    rank
}

/// Kahn's algorithm over the reachable nodes; ready nodes leave in ascending id order.
///
/// `Err` carries the nodes left with unsatisfied inputs.
/// Mark every still-cyclic component among `stuck` nodes as isolated, drop its internal
/// edges from `dag` and report it.
fn isolate_stuck_cycles(
    ids: &[NodeId],
    stuck: &[bool],
    dag: &mut Vec<Edge>,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeSet<NodeId> {
    let mut stuck_adj = vec![Vec::new(); ids.len()];
    for e in dag.iter() {
        if stuck[e.src] && stuck[e.dst] {
            stuck_adj[e.src].push(e.dst);
        }
    }
    let mut isolated = BTreeSet::new();
    for comp in tarjan_scc(&stuck_adj) {
        if !stuck[comp[0]] || !is_cyclic(&comp, &stuck_adj) {
            continue;
        }
        let members: Vec<NodeId> = comp.iter().map(|&i| ids[i]).collect();
        diagnostics.push(Diagnostic::structural(format!(
            "unresolvable cycle among {members:?}; region runs as passthrough"
        )));
        isolated.extend(members);
    }
    dag.retain(|e| !(isolated.contains(&ids[e.src]) && isolated.contains(&ids[e.dst])));
    isolated
}

fn kahn(ids: &[NodeId], reachable: &[bool], dag: &[Edge]) -> Result<Vec<NodeId>, Vec<bool>> {
    let n = ids.len();
    let mut indeg = vec![0u32; n];
    let mut dependents = vec![Vec::new(); n];
    for e in dag {
        if reachable[e.src] && reachable[e.dst] {
            indeg[e.dst] += 1;
            dependents[e.src].push(e.dst);
        }
    }

    let mut ready: BinaryHeap<Reverse<(NodeId, usize)>> = (0..n)
        .filter(|&i| reachable[i] && indeg[i] == 0)
        .map(|i| Reverse((ids[i], i)))
        .collect();
    let mut order = Vec::with_capacity(n);
    while let Some(Reverse((id, i))) = ready.pop() {
        order.push(id);
        for &d in &dependents[i] {
            indeg[d] -= 1;
            if indeg[d] == 0 {
                ready.push(Reverse((ids[d], d)));
            }
        }
    }

    let total = reachable.iter().filter(|r| **r).count();
    if order.len() == total {
        Ok(order)
    } else {
        Err((0..n).map(|i| reachable[i] && indeg[i] > 0).collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/plan.rs"]
mod tests;
