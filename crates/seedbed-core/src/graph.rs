use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A node of the table dependency graph.
pub trait DependencyNode {
    fn name(&self) -> &str;
    /// Names of the tables that must be populated before this one.
    fn depends_on(&self) -> &[String];
}

/// What to do with a dependency naming a table absent from the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDependencyPolicy {
    /// Treat the dependency as already satisfied and record it.
    #[default]
    Skip,
    /// Fail with [`Error::MissingDependency`].
    Fail,
}

/// A dependency that was skipped because its table is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDependency {
    pub table: String,
    pub dependency: String,
}

/// Tables in dependency order plus the dependencies that were skipped.
#[derive(Debug)]
pub struct DependencyOrder<T> {
    pub tables: Vec<T>,
    pub missing: Vec<MissingDependency>,
}

/// Summary of dependency graph structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencySummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for dependency ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    pub summary: DependencySummary,
    pub order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
    pub missing: Vec<MissingDependency>,
}

/// Order tables so every table follows the tables it depends on.
///
/// Depth-first over the input order; dependencies are visited in list order.
/// A table depending on itself is emitted once. A cycle among two or more
/// tables fails with [`Error::CyclicDependency`].
pub fn topological_order<T: DependencyNode>(
    tables: Vec<T>,
    policy: MissingDependencyPolicy,
) -> Result<DependencyOrder<T>> {
    let (order, missing) = order_indices(&tables, policy)?;

    let mut slots: Vec<Option<T>> = tables.into_iter().map(Some).collect();
    let tables = order
        .into_iter()
        .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
        .collect();

    Ok(DependencyOrder { tables, missing })
}

/// Build a dependency report without consuming the tables.
pub fn dependency_report<T: DependencyNode>(tables: &[T]) -> DependencyReport {
    let known: HashMap<&str, ()> = tables.iter().map(|table| (table.name(), ())).collect();
    let edges = tables
        .iter()
        .map(|table| {
            table
                .depends_on()
                .iter()
                .filter(|dep| known.contains_key(dep.as_str()))
                .count()
        })
        .sum();
    let summary = DependencySummary {
        nodes: tables.len(),
        edges,
    };

    match order_indices(tables, MissingDependencyPolicy::Skip) {
        Ok((order, missing)) => DependencyReport {
            summary,
            order: Some(
                order
                    .into_iter()
                    .map(|idx| tables[idx].name().to_string())
                    .collect(),
            ),
            cycle: None,
            missing,
        },
        Err(Error::CyclicDependency { cycle }) => DependencyReport {
            summary,
            order: None,
            cycle: Some(cycle),
            missing: Vec::new(),
        },
        Err(_) => DependencyReport {
            summary,
            order: None,
            cycle: None,
            missing: Vec::new(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Traversal<'a, T> {
    tables: &'a [T],
    index: HashMap<&'a str, usize>,
    marks: Vec<Mark>,
    stack: Vec<usize>,
    order: Vec<usize>,
    missing: Vec<MissingDependency>,
    policy: MissingDependencyPolicy,
}

fn order_indices<T: DependencyNode>(
    tables: &[T],
    policy: MissingDependencyPolicy,
) -> Result<(Vec<usize>, Vec<MissingDependency>)> {
    let mut index = HashMap::new();
    for (idx, table) in tables.iter().enumerate() {
        index.entry(table.name()).or_insert(idx);
    }

    let mut traversal = Traversal {
        tables,
        index,
        marks: vec![Mark::Unvisited; tables.len()],
        stack: Vec::new(),
        order: Vec::with_capacity(tables.len()),
        missing: Vec::new(),
        policy,
    };

    for idx in 0..tables.len() {
        if traversal.marks[idx] == Mark::Unvisited {
            traversal.visit(idx)?;
        }
    }

    Ok((traversal.order, traversal.missing))
}

impl<T: DependencyNode> Traversal<'_, T> {
    fn visit(&mut self, idx: usize) -> Result<()> {
        self.marks[idx] = Mark::InProgress;
        self.stack.push(idx);

        let tables = self.tables;
        let table = &tables[idx];
        for dependency in table.depends_on() {
            if dependency == table.name() {
                continue;
            }

            let Some(&dep_idx) = self.index.get(dependency.as_str()) else {
                self.record_missing(table.name(), dependency)?;
                continue;
            };

            match self.marks[dep_idx] {
                Mark::Done => {}
                Mark::Unvisited => self.visit(dep_idx)?,
                Mark::InProgress => {
                    let start = self
                        .stack
                        .iter()
                        .position(|item| *item == dep_idx)
                        .unwrap_or(0);
                    let mut cycle: Vec<String> = self.stack[start..]
                        .iter()
                        .map(|item| tables[*item].name().to_string())
                        .collect();
                    cycle.push(dependency.clone());
                    return Err(Error::CyclicDependency { cycle });
                }
            }
        }

        self.stack.pop();
        self.marks[idx] = Mark::Done;
        self.order.push(idx);
        Ok(())
    }

    fn record_missing(&mut self, table: &str, dependency: &str) -> Result<()> {
        match self.policy {
            MissingDependencyPolicy::Fail => Err(Error::MissingDependency {
                table: table.to_string(),
                dependency: dependency.to_string(),
            }),
            MissingDependencyPolicy::Skip => {
                let entry = MissingDependency {
                    table: table.to_string(),
                    dependency: dependency.to_string(),
                };
                if !self.missing.contains(&entry) {
                    self.missing.push(entry);
                }
                Ok(())
            }
        }
    }
}
