//! Dependency graph between parts.
//!
//! Each part follows at most one other part, so the graph is a set of
//! chains that may end in a cycle. `schedule` walks it with an explicit
//! stack and a per-category tri-state, producing an order in which every
//! target is placed before the parts that follow it. Cycles are broken
//! at the category the walk revisits.

use std::collections::HashMap;
use std::fmt;

/// A part's progress through the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// One step of a resolution schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Place the category, following its target if it has one.
    Place(String),
    /// Place the first category of the cycle without following anything.
    BreakCycle(Cycle),
}

impl Step {
    pub fn category(&self) -> &str {
        match self {
            Step::Place(category) => category,
            Step::BreakCycle(cycle) => cycle.category(),
        }
    }
}

/// A closed chain of `relativeTo` references.
///
/// The path starts and ends with the same category, e.g. `a -> b -> a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub path: Vec<String>,
}

impl Cycle {
    /// The category where the cycle was detected.
    pub fn category(&self) -> &str {
        self.path.first().map_or("", String::as_str)
    }

    /// Number of distinct categories in the cycle.
    pub fn len(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected: ")?;
        for (i, category) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", category)?;
        }
        Ok(())
    }
}

/// Graph of `part -> relativeTo` edges over the parts present this frame.
#[derive(Debug, Default)]
pub struct PartGraph {
    /// Categories in declaration order.
    order: Vec<String>,

    /// part -> the part it follows.
    edges: HashMap<String, String>,
}

impl PartGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(category, relativeTo)` pairs.
    ///
    /// Edges are only kept when the target is itself one of the
    /// categories; references to anything else are dropped.
    pub fn from_links<'a, I>(links: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let links: Vec<_> = links.into_iter().collect();
        let mut graph = Self::new();

        for (category, _) in &links {
            graph.register(category);
        }

        for (category, target) in links {
            if let Some(target) = target {
                if graph.contains(target) {
                    graph.add_dependency(category, target);
                }
            }
        }

        graph
    }

    /// Register a category (even if it follows nothing).
    pub fn register(&mut self, category: &str) {
        if !self.contains(category) {
            self.order.push(category.to_string());
        }
    }

    /// `from` is positioned relative to `to`. Replaces any earlier target.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        self.register(from);
        self.register(to);
        self.edges.insert(from.to_string(), to.to_string());
    }

    pub fn contains(&self, category: &str) -> bool {
        self.order.iter().any(|c| c == category)
    }

    /// The category `category` follows, if any.
    pub fn dependency_of(&self, category: &str) -> Option<&str> {
        self.edges.get(category).map(String::as_str)
    }

    /// Categories that follow `category` directly, in declaration order.
    pub fn dependents_of<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.order
            .iter()
            .filter(move |c| self.dependency_of(c) == Some(category))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Produce a placement order with targets before followers.
    ///
    /// Every category appears exactly once. When the walk reaches a
    /// category that is still in progress, that category is emitted as
    /// `BreakCycle` and treated as placed; the rest of the walk carries on.
    pub fn schedule(&self) -> Vec<Step> {
        let mut marks: HashMap<&str, Mark> =
            self.order.iter().map(|c| (c.as_str(), Mark::Unvisited)).collect();
        let mut steps = Vec::with_capacity(self.order.len());

        for root in &self.order {
            if marks[root.as_str()] != Mark::Unvisited {
                continue;
            }

            let mut stack: Vec<&str> = vec![root.as_str()];
            marks.insert(root, Mark::InProgress);

            while let Some(&current) = stack.last() {
                if marks[current] == Mark::Done {
                    stack.pop();
                    continue;
                }

                if let Some(target) = self.dependency_of(current) {
                    match marks[target] {
                        Mark::Unvisited => {
                            marks.insert(target, Mark::InProgress);
                            stack.push(target);
                            continue;
                        }
                        Mark::InProgress => {
                            let cycle = cycle_from(&stack, target);
                            steps.push(Step::BreakCycle(cycle));
                            marks.insert(target, Mark::Done);
                            continue;
                        }
                        Mark::Done => {}
                    }
                }

                steps.push(Step::Place(current.to_string()));
                marks.insert(current, Mark::Done);
                stack.pop();
            }
        }

        steps
    }

    /// Find every distinct cycle, each reported once.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let mut marks: HashMap<&str, Mark> =
            self.order.iter().map(|c| (c.as_str(), Mark::Unvisited)).collect();
        let mut cycles = Vec::new();

        for start in &self.order {
            let mut path: Vec<&str> = Vec::new();
            let mut current = Some(start.as_str());

            while let Some(category) = current {
                match marks[category] {
                    Mark::Done => break,
                    Mark::InProgress => {
                        cycles.push(cycle_from(&path, category));
                        break;
                    }
                    Mark::Unvisited => {
                        marks.insert(category, Mark::InProgress);
                        path.push(category);
                        current = self.dependency_of(category);
                    }
                }
            }

            for category in path {
                marks.insert(category, Mark::Done);
            }
        }

        cycles
    }
}

/// Cut the cycle out of a walk path that has just revisited `target`.
fn cycle_from(path: &[&str], target: &str) -> Cycle {
    let start = path.iter().position(|c| *c == target).unwrap_or(0);
    let mut cycle: Vec<String> = path[start..].iter().map(|c| c.to_string()).collect();
    cycle.push(target.to_string());
    Cycle { path: cycle }
}
