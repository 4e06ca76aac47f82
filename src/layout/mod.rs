//! Part layout: `relativeTo` dependency ordering and position resolution.

mod graph;
mod resolver;

pub use graph::{Cycle, PartGraph, Step};
pub use resolver::{resolve_positions, Position, PositionMap, PositionResolver, Resolution, SpriteMap};
