use std::collections::VecDeque;

use crate::ir::{Task, name_index};

use super::error::{LayoutError, Result};

/// Longest-path depth of every task, with sources at 0.
///
/// Dependency names that match no task are ignored. Tasks that can never
/// become ready are reported as a cycle instead of recursing forever.
pub fn resolve_depths(tasks: &[Task]) -> Result<Vec<usize>> {
    let index = name_index(tasks);
    let mut indegree = vec![0usize; tasks.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];

    for (idx, task) in tasks.iter().enumerate() {
        for dep in &task.depends_on {
            if let Some(&from) = index.get(dep.as_str()) {
                indegree[idx] += 1;
                dependents[from].push(idx);
            }
        }
    }

    let mut ready: VecDeque<usize> = indegree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(idx, _)| idx)
        .collect();
    let mut depth = vec![0usize; tasks.len()];
    let mut processed = 0usize;

    while let Some(current) = ready.pop_front() {
        processed += 1;
        for &next in &dependents[current] {
            depth[next] = depth[next].max(depth[current] + 1);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if processed < tasks.len() {
        let unresolved = tasks
            .iter()
            .zip(&indegree)
            .filter(|(_, deg)| **deg > 0)
            .map(|(task, _)| task.name.clone())
            .collect();
        return Err(LayoutError::Cycle { tasks: unresolved });
    }

    Ok(depth)
}

/// Buckets task indices by depth, keeping input order inside each layer.
pub fn group_layers(depths: &[usize]) -> Vec<Vec<usize>> {
    let Some(max_depth) = depths.iter().copied().max() else {
        return Vec::new();
    };
    let mut layers = vec![Vec::new(); max_depth + 1];
    for (idx, depth) in depths.iter().enumerate() {
        layers[*depth].push(idx);
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depths(tasks: &[Task]) -> Vec<usize> {
        resolve_depths(tasks).expect("acyclic input")
    }

    #[test]
    fn chain_with_shortcut_uses_longest_path() {
        let tasks = vec![
            Task::new("A"),
            Task::new("B").depends_on(&["A"]),
            Task::new("C").depends_on(&["A", "B"]),
        ];
        assert_eq!(depths(&tasks), vec![0, 1, 2]);
        assert_eq!(group_layers(&depths(&tasks)), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn diamond_shares_memoized_depth() {
        let tasks = vec![
            Task::new("vpc"),
            Task::new("subnet").depends_on(&["vpc"]),
            Task::new("sg").depends_on(&["vpc"]),
            Task::new("ecs").depends_on(&["subnet", "sg"]),
        ];
        assert_eq!(depths(&tasks), vec![0, 1, 1, 2]);
        assert_eq!(group_layers(&depths(&tasks)), vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn dangling_names_are_ignored() {
        let tasks = vec![Task::new("D").depends_on(&["Z"])];
        assert_eq!(depths(&tasks), vec![0]);
    }

    #[test]
    fn dependency_declared_after_dependent() {
        let tasks = vec![Task::new("late").depends_on(&["early"]), Task::new("early")];
        assert_eq!(depths(&tasks), vec![1, 0]);
    }

    #[test]
    fn cycle_is_reported_with_unresolved_tasks() {
        let tasks = vec![
            Task::new("root"),
            Task::new("a").depends_on(&["b", "root"]),
            Task::new("b").depends_on(&["a"]),
        ];
        let err = resolve_depths(&tasks).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Cycle {
                tasks: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let tasks = vec![Task::new("loop").depends_on(&["loop"])];
        assert!(resolve_depths(&tasks).is_err());
    }

    #[test]
    fn empty_input_has_no_layers() {
        assert!(group_layers(&depths(&[])).is_empty());
    }
}
