//! End-to-end checks across slicing, layout, compositing and export.

use avakit::config::{self, Composition};
use avakit::render::{encode, scale_nearest};
use avakit::types::{AutoPosition, Direction, PartPosition, Trim};
use avakit::{
    required_urls, slice_sheet, AvatarConfig, Canvas, Compositor, ExportOptions, ImageCache,
    ImageFormat, PartDescriptor, Selection, SelectionValue, SpriteSheetDescriptor,
};
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;

fn solid(width: u32, height: u32, colour: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(colour))
}

fn at(x: Option<f64>, y: Option<f64>) -> PartPosition {
    PartPosition {
        x,
        y,
        ..Default::default()
    }
}

fn render(config: &AvatarConfig, selection: &Selection, images: &ImageCache) -> (Canvas, avakit::RenderOutcome) {
    let composition = Composition::from_config(config).unwrap();
    let compositor = Compositor::new(&composition);
    let mut canvas = compositor.canvas();
    let outcome = compositor.render(selection, images, &mut canvas).unwrap();
    (canvas, outcome)
}

#[test]
fn test_grid_with_spacing() {
    let sheet = SpriteSheetDescriptor::new("faces.png", 95, 95, 5, 5).with_spacing(5, 5);
    let sprites = slice_sheet(&sheet).unwrap();

    assert_eq!(sprites.len(), 25);
    let sprite = sprites[6];
    assert_eq!((sprite.x, sprite.y, sprite.width, sprite.height), (100, 100, 95, 95));
}

#[test]
fn test_body_hangs_below_trimmed_head() {
    let trim = Trim {
        bottom: Some(35),
        ..Default::default()
    };
    let head = PartDescriptor::new(
        "head",
        SpriteSheetDescriptor::new("head.png", 95, 95, 1, 1).with_trim(trim),
    )
    .position(at(None, Some(40.0)))
    .z_index(1);
    let body = PartDescriptor::new("body", SpriteSheetDescriptor::new("body.png", 95, 95, 1, 1))
        .auto_position(AutoPosition::new("head", Direction::Below, 0.0));
    let config = AvatarConfig::new(200, 300, vec![head, body]);

    let mut images = ImageCache::new();
    images.insert("head.png", solid(95, 95, [255, 0, 0, 255]));
    images.insert("body.png", solid(95, 95, [0, 0, 255, 255]));

    let selection = Selection::new()
        .with("head", SelectionValue::Single(0))
        .with("body", SelectionValue::Single(0));
    let (canvas, outcome) = render(&config, &selection, &images);

    let order: Vec<_> = outcome.draws.iter().map(|d| d.category.as_str()).collect();
    assert_eq!(order, vec!["body", "head"]);

    let body = &outcome.draws[0];
    assert_eq!(body.y, 100.0);
    assert!(outcome.warnings.is_empty());

    // Head is drawn over the body where the two overlap
    let x = body.x as u32 + 10;
    assert_eq!(canvas.image().get_pixel(x, 120).0, [255, 0, 0, 255]);
    assert_eq!(canvas.image().get_pixel(x, 150).0, [0, 0, 255, 255]);
}

#[test]
fn test_mutual_follow_still_renders() {
    let a = PartDescriptor::new("a", SpriteSheetDescriptor::new("a.png", 4, 4, 1, 1))
        .auto_position(AutoPosition::new("b", Direction::Right, 0.0));
    let b = PartDescriptor::new("b", SpriteSheetDescriptor::new("b.png", 4, 4, 1, 1))
        .auto_position(AutoPosition::new("a", Direction::Right, 0.0));
    let config = AvatarConfig::new(16, 16, vec![a, b]);

    let mut images = ImageCache::new();
    images.insert("a.png", solid(4, 4, [1, 1, 1, 255]));
    images.insert("b.png", solid(4, 4, [2, 2, 2, 255]));

    let selection = Selection::new()
        .with("a", SelectionValue::Single(0))
        .with("b", SelectionValue::Single(0));
    let (_, outcome) = render(&config, &selection, &images);

    assert_eq!(outcome.draws.len(), 2);
    assert!(!outcome.warnings.is_empty());

    // Default anchor is top-centre: x = (16 - 4) / 2, y = 0
    let anchored = outcome
        .draws
        .iter()
        .filter(|d| d.x == 6.0 && d.y == 0.0)
        .count();
    assert!(anchored >= 1);
}

#[test]
fn test_optional_part_with_no_selection() {
    let head = PartDescriptor::new("head", SpriteSheetDescriptor::new("head.png", 4, 4, 1, 1));
    let body = PartDescriptor::new("body", SpriteSheetDescriptor::new("body.png", 4, 4, 1, 1))
        .optional(true);
    let config = AvatarConfig::new(8, 8, vec![head, body]);

    let selection = config::parse_selection(r#"{"head": 0, "body": null}"#).unwrap();
    assert_eq!(required_urls(&config, &selection).unwrap(), vec!["head.png".to_string()]);

    // Only the head image is available; rendering must not ask for the body
    let mut images = ImageCache::new();
    images.insert("head.png", solid(4, 4, [9, 9, 9, 255]));
    let (_, outcome) = render(&config, &selection, &images);

    let drawn: Vec<_> = outcome.draws.iter().map(|d| d.category.as_str()).collect();
    assert_eq!(drawn, vec!["head"]);
}

#[test]
fn test_export_scale_keeps_hard_edges() {
    let mut source = RgbaImage::new(100, 100);
    for (x, y, pixel) in source.enumerate_pixels_mut() {
        *pixel = Rgba([x as u8, y as u8, ((x + y) % 2 * 255) as u8, 255]);
    }

    let options = ExportOptions::default().with_scale(2.0);
    let encoded = encode(&source, &options).unwrap();
    assert_eq!(encoded.format, ImageFormat::Png);
    assert_eq!((encoded.width, encoded.height), (200, 200));

    let decoded = image::load_from_memory(&encoded.bytes).unwrap().to_rgba8();
    for (x, y, pixel) in decoded.enumerate_pixels() {
        assert_eq!(pixel, source.get_pixel(x / 2, y / 2));
    }
}

#[test]
fn test_pixel_scale_matches_upscaled_render() {
    let sheet = SpriteSheetDescriptor::new("s.png", 3, 2, 1, 1);
    let config_at = |config_scale: f64| {
        AvatarConfig::new(
            (8.0 * config_scale) as u32,
            (8.0 * config_scale) as u32,
            vec![PartDescriptor::new("s", sheet.clone()).position(at(Some(2.0), Some(5.0)))],
        )
        .with_pixel_scale(config_scale)
    };

    let mut sprite = RgbaImage::new(3, 2);
    sprite.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
    sprite.put_pixel(2, 1, Rgba([40, 50, 60, 128]));
    let mut images = ImageCache::new();
    images.insert("s.png", sprite);

    let selection = Selection::new().with("s", SelectionValue::Single(0));
    let (small, _) = render(&config_at(1.0), &selection, &images);
    let (large, _) = render(&config_at(2.0), &selection, &images);

    assert_eq!(large.image().dimensions(), (16, 16));
    assert_eq!(large.image(), &scale_nearest(small.image(), 2.0).unwrap());
}

#[test]
fn test_config_round_trips_through_json() {
    let trim = Trim {
        top: Some(2),
        ..Default::default()
    };
    let config = AvatarConfig::new(
        120,
        160,
        vec![
            PartDescriptor::new(
                "head",
                SpriteSheetDescriptor::new("head.png", 40, 40, 3, 2)
                    .with_spacing(1, 1)
                    .with_trim(trim),
            )
            .z_index(2),
            PartDescriptor::with_sheets(
                "hair",
                vec![
                    SpriteSheetDescriptor::new("hair-a.png", 40, 20, 4, 1),
                    SpriteSheetDescriptor::new("hair-b.png", 40, 20, 4, 1),
                ],
            )
            .auto_position(AutoPosition::new("head", Direction::Above, -4.0))
            .optional(true),
        ],
    )
    .with_pixel_scale(2.0);

    let json = config::to_json(&config).unwrap();
    assert_eq!(config::parse_json(&json).unwrap(), config);
}
