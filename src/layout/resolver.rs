//! Position resolution.
//!
//! Given the parts that have a sprite this frame, work out where each
//! sprite's top-left corner goes on the (unscaled) canvas. Per axis the
//! priority is: explicit coordinate, then relative placement against the
//! followed part's content box, then the canvas anchor. Offsets are added
//! last.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{Follow, Part, Placement};
use crate::types::{AnchorX, AnchorY, ContentBounds, Direction, Sprite};
use crate::validation::Diagnostic;

use super::graph::{PartGraph, Step};

/// Resolved top-left corner of a part, in unscaled canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Resolved positions keyed by category.
pub type PositionMap = BTreeMap<String, Position>;

/// Active sprite per category.
pub type SpriteMap = BTreeMap<String, Sprite>;

/// Positions plus any non-fatal warnings raised while resolving.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub positions: PositionMap,
    pub warnings: Vec<Diagnostic>,
}

/// Resolves part positions against a canvas of fixed size.
#[derive(Debug, Clone, Copy)]
pub struct PositionResolver {
    canvas_width: f64,
    canvas_height: f64,
}

impl PositionResolver {
    /// Create a resolver for a canvas in unscaled units.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
        }
    }

    /// Resolve every part that has an entry in `sprites`.
    ///
    /// Parts without a sprite are skipped and absent from the result. A
    /// part following a category that is not present falls back to its
    /// anchor. A `relativeTo` cycle is broken at the category the walk
    /// revisits, which is placed by its anchor, and reported as a warning.
    pub fn resolve(&self, parts: &[Part], sprites: &SpriteMap) -> Resolution {
        let mut present: BTreeMap<&str, &Part> = BTreeMap::new();
        let mut links = Vec::new();
        for part in parts {
            let category = part.category.as_str();
            if !sprites.contains_key(category) || present.contains_key(category) {
                continue;
            }
            present.insert(category, part);
            links.push((category, part.follow.as_ref().map(|f| f.target.as_str())));
        }

        let graph = PartGraph::from_links(links);
        let mut resolution = Resolution::default();

        for step in graph.schedule() {
            let category = step.category();
            let (Some(part), Some(sprite)) = (present.get(category), sprites.get(category)) else {
                continue;
            };

            let anchor = match &step {
                Step::Place(_) => part.follow.as_ref().and_then(|follow| {
                    let target = resolution.positions.get(&follow.target)?;
                    let target_sprite = sprites.get(&follow.target)?;
                    Some(Anchor {
                        follow,
                        position: *target,
                        sprite: target_sprite,
                    })
                }),
                Step::BreakCycle(cycle) => {
                    resolution.warnings.push(
                        Diagnostic::warning("avakit::layout::cycle", cycle.to_string()).with_help(
                            format!(
                                "Auto-positioning was skipped for '{}'; it was placed by its anchor instead",
                                category
                            ),
                        ),
                    );
                    None
                }
            };

            let position = self.place(&part.placement, sprite, anchor);
            resolution.positions.insert(category.to_string(), position);
        }

        resolution
    }

    /// Position a single sprite.
    fn place(&self, placement: &Placement, sprite: &Sprite, anchor: Option<Anchor<'_>>) -> Position {
        let relative = anchor.map(|a| a.relative_position(sprite));

        let x = placement
            .x
            .or(relative.map(|p| p.x))
            .unwrap_or_else(|| anchor_x(placement.anchor_x, sprite.width, self.canvas_width));
        let y = placement
            .y
            .or(relative.map(|p| p.y))
            .unwrap_or_else(|| anchor_y(placement.anchor_y, sprite.height, self.canvas_height));

        Position::new(x + placement.offset_x, y + placement.offset_y)
    }
}

/// Resolve positions and drop the warnings.
pub fn resolve_positions(
    parts: &[Part],
    sprites: &SpriteMap,
    canvas_width: f64,
    canvas_height: f64,
) -> PositionMap {
    PositionResolver::new(canvas_width, canvas_height)
        .resolve(parts, sprites)
        .positions
}

/// The already-placed part another part follows.
#[derive(Clone, Copy)]
struct Anchor<'a> {
    follow: &'a Follow,
    position: Position,
    sprite: &'a Sprite,
}

impl Anchor<'_> {
    /// Place `sprite` against this anchor's content box.
    ///
    /// The axis the direction drives gets the directional formula; the
    /// other axis is centred on the target's content.
    fn relative_position(&self, sprite: &Sprite) -> Position {
        let target = bounds(&self.sprite.content_bounds());
        let own = bounds(&sprite.content_bounds());
        let gap = self.follow.gap;

        let left = self.position.x + target.offset_x;
        let top = self.position.y + target.offset_y;
        let centre_x = left + (target.width - own.width) / 2.0 - own.offset_x;
        let centre_y = top + (target.height - own.height) / 2.0 - own.offset_y;

        match self.follow.direction {
            Direction::Below => Position::new(centre_x, top + target.height - own.offset_y + gap),
            Direction::Above => Position::new(centre_x, top - own.height - own.offset_y - gap),
            Direction::Right => Position::new(left + target.width - own.offset_x + gap, centre_y),
            Direction::Left => Position::new(left - own.width - own.offset_x - gap, centre_y),
            Direction::Center => Position::new(centre_x, centre_y),
        }
    }
}

struct Bounds {
    width: f64,
    height: f64,
    offset_x: f64,
    offset_y: f64,
}

fn bounds(content: &ContentBounds) -> Bounds {
    Bounds {
        width: content.width as f64,
        height: content.height as f64,
        offset_x: content.offset_x as f64,
        offset_y: content.offset_y as f64,
    }
}

fn anchor_x(anchor: AnchorX, width: u32, canvas_width: f64) -> f64 {
    match anchor {
        AnchorX::Left => 0.0,
        AnchorX::Center => (canvas_width - width as f64) / 2.0,
        AnchorX::Right => canvas_width - width as f64,
    }
}

fn anchor_y(anchor: AnchorY, height: u32, canvas_height: f64) -> f64 {
    match anchor {
        AnchorY::Top => 0.0,
        AnchorY::Center => (canvas_height - height as f64) / 2.0,
        AnchorY::Bottom => canvas_height - height as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AutoPosition, PartDescriptor, PartPosition, SpriteSheetDescriptor};
    use crate::validation::Severity;

    fn part(category: &str) -> PartDescriptor {
        PartDescriptor::new(category, SpriteSheetDescriptor::new("s.png", 10, 10, 1, 1))
    }

    fn following(category: &str, target: &str, direction: Direction, gap: f64) -> PartDescriptor {
        part(category).auto_position(AutoPosition::new(target, direction, gap))
    }

    fn at(x: Option<f64>, y: Option<f64>) -> PartPosition {
        PartPosition {
            x,
            y,
            ..PartPosition::default()
        }
    }

    fn parts(descriptors: &[PartDescriptor]) -> Vec<Part> {
        descriptors.iter().map(Part::from).collect()
    }

    fn sprite(width: u32, height: u32) -> Sprite {
        Sprite::new(0, 0, 0, width, height)
    }

    fn trimmed(width: u32, height: u32, top: u32, bottom: u32, left: u32, right: u32) -> Sprite {
        let mut s = sprite(width, height);
        s.content = Some(ContentBounds {
            width: width - left - right,
            height: height - top - bottom,
            offset_x: left,
            offset_y: top,
        });
        s
    }

    fn sprites(entries: &[(&str, Sprite)]) -> SpriteMap {
        entries.iter().map(|(c, s)| (c.to_string(), *s)).collect()
    }

    #[test]
    fn test_default_anchor_is_top_centre() {
        let resolved = resolve_positions(
            &parts(&[part("head")]),
            &sprites(&[("head", sprite(10, 10))]),
            100.0,
            50.0,
        );
        assert_eq!(resolved["head"], Position::new(45.0, 0.0));
    }

    #[test]
    fn test_anchors() {
        let descriptor = part("head").position(PartPosition {
            anchor_x: Some(AnchorX::Right),
            anchor_y: Some(AnchorY::Bottom),
            ..PartPosition::default()
        });
        let resolved = resolve_positions(
            &parts(&[descriptor]),
            &sprites(&[("head", sprite(10, 20))]),
            100.0,
            50.0,
        );
        assert_eq!(resolved["head"], Position::new(90.0, 30.0));

        let descriptor = part("head").position(PartPosition {
            anchor_x: Some(AnchorX::Left),
            anchor_y: Some(AnchorY::Center),
            ..PartPosition::default()
        });
        let resolved = resolve_positions(
            &parts(&[descriptor]),
            &sprites(&[("head", sprite(10, 20))]),
            100.0,
            50.0,
        );
        assert_eq!(resolved["head"], Position::new(0.0, 15.0));
    }

    #[test]
    fn test_explicit_position_and_offsets() {
        let descriptor = part("head").position(PartPosition {
            x: Some(7.0),
            y: Some(3.0),
            offset_x: Some(2.0),
            offset_y: Some(-1.0),
            ..PartPosition::default()
        });
        let resolved = resolve_positions(
            &parts(&[descriptor]),
            &sprites(&[("head", sprite(10, 10))]),
            100.0,
            100.0,
        );
        assert_eq!(resolved["head"], Position::new(9.0, 2.0));
    }

    #[test]
    fn test_below_uses_content_box() {
        // head: 95x95 with 35px transparent padding at the bottom, y = 40
        let head = part("head").position(at(None, Some(40.0)));
        let body = following("body", "head", Direction::Below, 0.0);

        let resolved = resolve_positions(
            &parts(&[head, body]),
            &sprites(&[("head", trimmed(95, 95, 0, 35, 0, 0)), ("body", sprite(95, 95))]),
            200.0,
            300.0,
        );

        assert_eq!(resolved["head"].y, 40.0);
        assert_eq!(resolved["body"].y, 100.0);
        // Cross axis centred on the head's content
        assert_eq!(resolved["body"].x, resolved["head"].x);
    }

    #[test]
    fn test_above_with_gap() {
        let base = part("base").position(at(Some(0.0), Some(50.0)));
        let hat = following("hat", "base", Direction::Above, 2.0);

        let resolved = resolve_positions(
            &parts(&[base, hat]),
            &sprites(&[("base", trimmed(20, 20, 4, 0, 0, 0)), ("hat", trimmed(10, 8, 1, 2, 0, 0))]),
            100.0,
            100.0,
        );

        // 50 + 4 - 5 - 1 - 2
        assert_eq!(resolved["hat"].y, 46.0);
        // 0 + (20 - 10) / 2
        assert_eq!(resolved["hat"].x, 5.0);
    }

    #[test]
    fn test_left_and_right() {
        let base = part("base").position(at(Some(40.0), Some(10.0)));
        let right = following("right", "base", Direction::Right, 3.0);
        let left = following("left", "base", Direction::Left, 3.0);

        let resolved = resolve_positions(
            &parts(&[base, right, left]),
            &sprites(&[
                ("base", trimmed(20, 20, 0, 0, 2, 2)),
                ("right", sprite(10, 10)),
                ("left", trimmed(10, 10, 0, 0, 1, 0)),
            ]),
            100.0,
            100.0,
        );

        // 40 + 2 + 16 - 0 + 3
        assert_eq!(resolved["right"].x, 61.0);
        // 40 + 2 - 9 - 1 - 3
        assert_eq!(resolved["left"].x, 29.0);
        // Vertically centred: 10 + (20 - 10) / 2
        assert_eq!(resolved["right"].y, 15.0);
    }

    #[test]
    fn test_center_mode() {
        let base = part("base").position(at(Some(10.0), Some(10.0)));
        let badge = following("badge", "base", Direction::Center, 99.0);

        let resolved = resolve_positions(
            &parts(&[base, badge]),
            &sprites(&[("base", sprite(30, 20)), ("badge", sprite(10, 10))]),
            100.0,
            100.0,
        );

        // Gap does not apply to centring
        assert_eq!(resolved["badge"], Position::new(20.0, 15.0));
    }

    #[test]
    fn test_explicit_axis_overrides_relative() {
        let head = part("head").position(at(Some(0.0), Some(0.0)));
        let body = following("body", "head", Direction::Below, 0.0).position(PartPosition {
            x: Some(33.0),
            offset_y: Some(1.0),
            ..PartPosition::default()
        });

        let resolved = resolve_positions(
            &parts(&[head, body]),
            &sprites(&[("head", sprite(10, 10)), ("body", sprite(10, 10))]),
            100.0,
            100.0,
        );

        assert_eq!(resolved["body"], Position::new(33.0, 11.0));
    }

    #[test]
    fn test_missing_target_falls_back_to_anchor() {
        let body = following("body", "head", Direction::Below, 5.0);
        let resolution = PositionResolver::new(100.0, 100.0)
            .resolve(&parts(&[part("head"), body]), &sprites(&[("body", sprite(10, 10))]));

        assert_eq!(resolution.positions.len(), 1);
        assert_eq!(resolution.positions["body"], Position::new(45.0, 0.0));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_parts_without_sprite_are_absent() {
        let resolved = resolve_positions(
            &parts(&[part("head"), part("body")]),
            &sprites(&[("head", sprite(10, 10))]),
            100.0,
            100.0,
        );
        assert!(resolved.contains_key("head"));
        assert!(!resolved.contains_key("body"));
    }

    #[test]
    fn test_order_invariance() {
        let declared = vec![
            following("hat", "head", Direction::Above, 1.0),
            following("body", "head", Direction::Below, 0.0),
            following("legs", "body", Direction::Below, 2.0),
            part("head").position(at(None, Some(30.0))),
            following("badge", "body", Direction::Right, 0.0),
        ];
        let map = sprites(&[
            ("hat", trimmed(12, 8, 0, 2, 1, 1)),
            ("body", trimmed(16, 16, 2, 0, 0, 0)),
            ("legs", sprite(14, 10)),
            ("head", trimmed(10, 10, 1, 3, 0, 0)),
            ("badge", sprite(4, 4)),
        ]);

        let expected = resolve_positions(&parts(&declared), &map, 64.0, 128.0);

        let mut reversed = declared.clone();
        reversed.reverse();
        assert_eq!(resolve_positions(&parts(&reversed), &map, 64.0, 128.0), expected);

        let mut rotated = declared.clone();
        rotated.rotate_left(2);
        assert_eq!(resolve_positions(&parts(&rotated), &map, 64.0, 128.0), expected);
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let a = following("a", "b", Direction::Below, 0.0);
        let b = following("b", "a", Direction::Below, 0.0);

        let resolution = PositionResolver::new(100.0, 100.0).resolve(
            &parts(&[a, b]),
            &sprites(&[("a", sprite(10, 10)), ("b", sprite(10, 10))]),
        );

        assert_eq!(resolution.positions.len(), 2);
        // `a` is where the cycle was broken: default anchor
        assert_eq!(resolution.positions["a"], Position::new(45.0, 0.0));
        // `b` still follows `a`
        assert_eq!(resolution.positions["b"], Position::new(45.0, 10.0));

        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(resolution.warnings[0].severity, Severity::Warning);
        assert_eq!(resolution.warnings[0].code, "avakit::layout::cycle");
    }

    #[test]
    fn test_self_cycle_terminates() {
        let a = following("a", "a", Direction::Right, 0.0);
        let resolution = PositionResolver::new(100.0, 100.0)
            .resolve(&parts(&[a]), &sprites(&[("a", sprite(10, 10))]));
        assert_eq!(resolution.positions["a"], Position::new(45.0, 0.0));
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_long_cycle_terminates() {
        let declared: Vec<_> = (0..6)
            .map(|i| {
                following(
                    &format!("p{}", i),
                    &format!("p{}", (i + 1) % 6),
                    Direction::Below,
                    1.0,
                )
            })
            .collect();
        let map: SpriteMap = (0..6).map(|i| (format!("p{}", i), sprite(8, 8))).collect();

        let resolution = PositionResolver::new(64.0, 64.0).resolve(&parts(&declared), &map);
        assert_eq!(resolution.positions.len(), 6);
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let declared = vec![
            following("a", "b", Direction::Left, 1.0),
            following("b", "a", Direction::Above, 1.0),
            part("c"),
        ];
        let map = sprites(&[("a", sprite(5, 5)), ("b", sprite(6, 6)), ("c", sprite(7, 7))]);
        let resolver = PositionResolver::new(50.0, 50.0);
        let first = resolver.resolve(&parts(&declared), &map);
        let second = resolver.resolve(&parts(&declared), &map);
        assert_eq!(first.positions, second.positions);
    }

    #[test]
    fn test_fractional_centre() {
        let resolved = resolve_positions(
            &parts(&[part("head")]),
            &sprites(&[("head", sprite(9, 9))]),
            20.0,
            20.0,
        );
        assert_eq!(resolved["head"].x, 5.5);
    }
}
