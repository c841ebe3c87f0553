//! Topological ordering of work orders.
//!
//! Kahn's algorithm over parent→child edges: compute in-degrees, seed a
//! queue with zero-in-degree nodes, then repeatedly emit the queue head
//! and decrement its successors.
//!
//! # Determinism
//! The ready queue is FIFO over node insertion order, so ties among
//! simultaneously ready nodes resolve to the order work orders appeared
//! in the input.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4

use std::collections::{HashMap, VecDeque};

use crate::error::ReflowError;

/// Orders `nodes` so every node appears after all its parents.
///
/// Edges are `(parent, child)` pairs; edges naming unknown nodes are
/// silently ignored. If fewer nodes are emitted than supplied, the graph
/// has a cycle and the error carries every node whose in-degree stayed
/// positive, in insertion order.
pub fn topo_sort(nodes: &[String], edges: &[(String, String)]) -> Result<Vec<String>, ReflowError> {
    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|n| (n.as_str(), 0)).collect();
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();

    for (parent, child) in edges {
        if !in_degree.contains_key(parent.as_str()) || !in_degree.contains_key(child.as_str()) {
            continue;
        }
        successors
            .entry(parent.as_str())
            .or_default()
            .push(child.as_str());
        *in_degree
            .get_mut(child.as_str())
            .expect("child registered above") += 1;
    }

    let mut ready: VecDeque<&str> = nodes
        .iter()
        .map(String::as_str)
        .filter(|n| in_degree[n] == 0)
        .collect();
    let mut order: Vec<String> = Vec::with_capacity(nodes.len());

    while let Some(node) = ready.pop_front() {
        order.push(node.to_string());
        if let Some(children) = successors.get(node) {
            for &child in children {
                let degree = in_degree
                    .get_mut(child)
                    .expect("successors only reference registered nodes");
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(child);
                }
            }
        }
    }

    if order.len() < nodes.len() {
        let ids = nodes
            .iter()
            .filter(|n| in_degree[n.as_str()] > 0)
            .cloned()
            .collect();
        return Err(ReflowError::CircularDependency { ids });
    }
    Ok(order)
}
