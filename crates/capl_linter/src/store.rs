//! C3: the symbol store. Persists per-file facts and answers
//! transitive-visibility and cross-reference queries over the include
//! graph. The include graph is represented as adjacency lists plus a
//! separately stored set of strongly connected components with two or
//! more members: visibility queries unify SCC membership
//! before traversal so a cycle never causes infinite recursion.

use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::{Hash, Hasher};

use crate::facts::{FileFacts, Include, Reference, Symbol, SymbolKind};

#[derive(Debug, Clone)]
struct FileEntry {
    facts: FileFacts,
    content_hash: u64,
}

/// A detected cycle in the include graph, reported once per cycle and
/// attached to its lexicographically smallest member (W001, S4).
#[derive(Debug, Clone)]
pub struct IncludeCycle {
    pub members: Vec<String>,
}

impl IncludeCycle {
    pub fn anchor_file(&self) -> &str {
        self.members
            .iter()
            .min()
            .expect("a cycle has at least one member")
    }
}

/// Persists facts per file and answers transitive visibility queries. A
/// single writer updates facts for a file at a time; readers may run
/// concurrently within one analysis pass.
#[derive(Debug, Default)]
pub struct SymbolStore {
    files: FxHashMap<String, FileEntry>,
}

fn hash_content(content: &str) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    content.hash(&mut hasher);
    hasher.finish()
}

impl SymbolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or update) the facts for a file. Facts are only
    /// recomputed by the caller when the content hash changes; the
    /// store itself just tracks the hash it was given so it can tell a
    /// no-op update from a real one.
    pub fn update_file(&mut self, path: &str, content: &str, facts: FileFacts) -> bool {
        let hash = hash_content(content);
        if let Some(entry) = self.files.get(path) {
            if entry.content_hash == hash {
                log::debug!("{path}: content hash unchanged, skipping fact recomputation");
                return false;
            }
        }
        self.files.insert(
            path.to_string(),
            FileEntry {
                facts,
                content_hash: hash,
            },
        );
        true
    }

    pub fn evict(&mut self, path: &str) {
        self.files.remove(path);
    }

    pub fn symbols_in(&self, path: &str) -> &[Symbol] {
        self.files
            .get(path)
            .map(|e| e.facts.symbols.as_slice())
            .unwrap_or(&[])
    }

    pub fn includes_in(&self, path: &str) -> &[Include] {
        self.files
            .get(path)
            .map(|e| e.facts.includes.as_slice())
            .unwrap_or(&[])
    }

    pub fn references_from(&self, path: &str) -> &[Reference] {
        self.files
            .get(path)
            .map(|e| e.facts.references.as_slice())
            .unwrap_or(&[])
    }

    pub fn references_to<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Reference> + 'a {
        self.files
            .values()
            .flat_map(|e| e.facts.references.iter())
            .filter(move |r| r.referenced_name == name)
    }

    /// Adjacency list of the include graph: file path → the set of
    /// target paths it textually includes, resolved via `resolve`.
    fn adjacency(&self, resolve: &dyn Fn(&str, &str) -> Option<String>) -> FxHashMap<String, Vec<String>> {
        let mut adjacency: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for (path, entry) in &self.files {
            let targets = entry
                .facts
                .includes
                .iter()
                .filter(|inc| !inc.angle_bracket)
                .filter_map(|inc| resolve(path, &inc.target_path_text))
                .collect();
            adjacency.insert(path.clone(), targets);
        }
        adjacency
    }

    /// Union of facts in `path` and every file transitively reachable
    /// from it via `#include`, closed over the DAG. Each
    /// member of a cycle sees the union of the cycle's facts, computed
    /// once rather than per visiting member.
    pub fn visible_symbols(
        &self,
        path: &str,
        resolve: &dyn Fn(&str, &str) -> Option<String>,
    ) -> Vec<Symbol> {
        let adjacency = self.adjacency(resolve);
        let sccs = tarjan_scc(&adjacency);
        let scc_of: FxHashMap<&str, usize> = sccs
            .iter()
            .enumerate()
            .flat_map(|(i, members)| members.iter().map(move |m| (m.as_str(), i)))
            .collect();

        let mut visited_sccs = FxHashSet::default();
        let mut visited_files = FxHashSet::default();
        let mut queue = vec![path.to_string()];
        let mut out = Vec::new();

        while let Some(file) = queue.pop() {
            if !visited_files.insert(file.clone()) {
                continue;
            }
            if let Some(symbols) = self.files.get(&file).map(|e| &e.facts.symbols) {
                out.extend(symbols.iter().cloned());
            }
            if let Some(&scc_idx) = scc_of.get(file.as_str()) {
                if visited_sccs.insert(scc_idx) {
                    for member in &sccs[scc_idx] {
                        if member != &file {
                            queue.push(member.clone());
                        }
                    }
                }
            }
            if let Some(targets) = adjacency.get(&file) {
                queue.extend(targets.iter().cloned());
            }
        }
        out
    }

    /// Cycles detected during DAG construction (W001's source of truth).
    pub fn include_cycles(&self, resolve: &dyn Fn(&str, &str) -> Option<String>) -> Vec<IncludeCycle> {
        let adjacency = self.adjacency(resolve);
        tarjan_scc(&adjacency)
            .into_iter()
            .filter(|members| members.len() > 1 || self_loop(&adjacency, members))
            .map(|members| IncludeCycle { members })
            .collect()
    }

    /// Names whose `(kind = function, has_body = true)` count across the
    /// project exceeds one (E012's source of truth).
    pub fn duplicate_functions(&self) -> Vec<(String, Vec<Symbol>)> {
        let mut by_name: FxHashMap<String, Vec<Symbol>> = FxHashMap::default();
        for entry in self.files.values() {
            for symbol in &entry.facts.symbols {
                if symbol.kind.is_function() && symbol.has_body {
                    by_name
                        .entry(symbol.name.clone())
                        .or_default()
                        .push(symbol.clone());
                }
            }
        }
        by_name.into_iter().filter(|(_, defs)| defs.len() > 1).collect()
    }

    pub fn known_files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

fn self_loop(adjacency: &FxHashMap<String, Vec<String>>, members: &[String]) -> bool {
    members.len() == 1
        && adjacency
            .get(&members[0])
            .is_some_and(|targets| targets.contains(&members[0]))
}

/// Tarjan's strongly-connected-components algorithm, iterative to avoid
/// stack depth issues on deep include chains. Each `Frame` is a suspended
/// call to the textbook `strongconnect(node)`, resumable at the child it
/// was partway through visiting; lowlink propagation on a simulated
/// "return" happens when a frame is popped, same as the recursive form.
fn tarjan_scc(adjacency: &FxHashMap<String, Vec<String>>) -> Vec<Vec<String>> {
    struct Frame {
        node: String,
        next_child: usize,
    }

    let empty: Vec<String> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut lowlink: FxHashMap<String, usize> = FxHashMap::default();
    let mut on_stack: FxHashSet<String> = FxHashSet::default();
    let mut stack: Vec<String> = Vec::new();
    let mut counter = 0usize;
    let mut sccs: Vec<Vec<String>> = Vec::new();

    let mut nodes: Vec<&String> = adjacency.keys().collect();
    nodes.sort();

    for start in nodes {
        if index.contains_key(start) {
            continue;
        }

        index.insert(start.clone(), counter);
        lowlink.insert(start.clone(), counter);
        counter += 1;
        stack.push(start.clone());
        on_stack.insert(start.clone());

        let mut work = vec![Frame {
            node: start.clone(),
            next_child: 0,
        }];

        while let Some(frame) = work.last_mut() {
            let targets = adjacency.get(&frame.node).unwrap_or(&empty);
            if let Some(target) = targets.get(frame.next_child) {
                frame.next_child += 1;
                if !index.contains_key(target) {
                    index.insert(target.clone(), counter);
                    lowlink.insert(target.clone(), counter);
                    counter += 1;
                    stack.push(target.clone());
                    on_stack.insert(target.clone());
                    work.push(Frame {
                        node: target.clone(),
                        next_child: 0,
                    });
                } else if on_stack.contains(target) {
                    let target_index = index[target];
                    let node_low = lowlink[&frame.node];
                    lowlink.insert(frame.node.clone(), node_low.min(target_index));
                }
                continue;
            }

            // no more children: close out `node` and propagate to its caller
            let node = work.pop().expect("work non-empty").node;
            if lowlink[&node] == index[&node] {
                let mut component = Vec::new();
                loop {
                    let member = stack.pop().expect("stack non-empty while closing SCC");
                    on_stack.remove(&member);
                    let is_node = member == node;
                    component.push(member);
                    if is_node {
                        break;
                    }
                }
                sccs.push(component);
            }
            if let Some(parent) = work.last() {
                let parent_low = lowlink[&parent.node];
                let node_low = lowlink[&node];
                lowlink.insert(parent.node.clone(), parent_low.min(node_low));
            }
        }
    }

    sccs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{DeclaredScope, SymbolKind};
    use ruff_text_size::TextRange;

    fn symbol(name: &str, file: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            defining_file: file.to_string(),
            range: TextRange::default(),
            declared_in_scope: DeclaredScope::GlobalVariablesBlock,
            type_text: "int".to_string(),
            has_body: false,
            param_count: 0,
            is_forward_declaration: false,
            parent_symbol: None,
            statements_before_in_block: 0,
        }
    }

    #[test]
    fn visibility_closes_over_transitive_includes() {
        let mut store = SymbolStore::new();
        store.update_file(
            "a.can",
            "a",
            FileFacts {
                symbols: vec![symbol("a_sym", "a.can")],
                includes: vec![Include {
                    source_file: "a.can".into(),
                    target_path_text: "b.cin".into(),
                    resolved_path: None,
                    range: TextRange::default(),
                    angle_bracket: false,
                }],
                references: vec![],
            },
        );
        store.update_file(
            "b.cin",
            "b",
            FileFacts {
                symbols: vec![symbol("b_sym", "b.cin")],
                includes: vec![Include {
                    source_file: "b.cin".into(),
                    target_path_text: "c.cin".into(),
                    resolved_path: None,
                    range: TextRange::default(),
                    angle_bracket: false,
                }],
                references: vec![],
            },
        );
        store.update_file(
            "c.cin",
            "c",
            FileFacts {
                symbols: vec![symbol("c_sym", "c.cin")],
                includes: vec![],
                references: vec![],
            },
        );

        let resolve = |_: &str, target: &str| Some(target.to_string());
        let visible = store.visible_symbols("a.can", &resolve);
        let names: Vec<&str> = visible.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"a_sym"));
        assert!(names.contains(&"b_sym"));
        assert!(names.contains(&"c_sym"));
    }

    #[test]
    fn cycle_is_reported_once_and_still_resolves_symbols() {
        let mut store = SymbolStore::new();
        store.update_file(
            "a.can",
            "a",
            FileFacts {
                symbols: vec![symbol("a_sym", "a.can")],
                includes: vec![Include {
                    source_file: "a.can".into(),
                    target_path_text: "b.can".into(),
                    resolved_path: None,
                    range: TextRange::default(),
                    angle_bracket: false,
                }],
                references: vec![],
            },
        );
        store.update_file(
            "b.can",
            "b",
            FileFacts {
                symbols: vec![symbol("b_sym", "b.can")],
                includes: vec![Include {
                    source_file: "b.can".into(),
                    target_path_text: "a.can".into(),
                    resolved_path: None,
                    range: TextRange::default(),
                    angle_bracket: false,
                }],
                references: vec![],
            },
        );

        let resolve = |_: &str, target: &str| Some(target.to_string());
        let cycles = store.include_cycles(&resolve);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].anchor_file(), "a.can");

        let visible = store.visible_symbols("a.can", &resolve);
        assert_eq!(visible.len(), 2);
    }
}
