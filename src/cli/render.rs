//! Render command implementation.
//!
//! Loads a configuration and selection, composites the avatar and writes
//! the exported image. With `--watch` it re-renders whenever the
//! configuration or selection file changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use clap::Args;
use notify::{RecursiveMode, Watcher};

use crate::assets::{FileLoader, ImageCache};
use crate::config::{self, Composition};
use crate::error::{AvatarError, Result};
use crate::output::{display_path, plural, Printer};
use crate::render::{encode, write_image, Compositor};
use crate::types::ImageFormat;
use crate::validation::{print_diagnostics, validate_config, validate_selection};

use super::selection_from_args;

/// Render an avatar to an image file
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Configuration file (JSON or YAML)
    #[arg(required = true)]
    pub config: PathBuf,

    /// Selection file (JSON)
    #[arg(long, short)]
    pub selection: Option<PathBuf>,

    /// Select a sprite: category=none|N|SHEET:N (repeatable)
    #[arg(long = "select", value_name = "CATEGORY=VALUE")]
    pub select: Vec<String>,

    /// Output file (default: avatar.<format> next to the configuration)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Output format (overrides exportConfig.format)
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Output scale (overrides exportConfig.scale)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Also print the image as a data URL on stdout
    #[arg(long)]
    pub data_url: bool,

    /// Only draw the categories the configuration's preset lists
    #[arg(long)]
    pub preset_filter: bool,

    /// Re-render when the configuration or selection changes
    #[arg(long)]
    pub watch: bool,
}

pub fn run(args: RenderArgs, printer: &Printer) -> Result<()> {
    let mut cache = ImageCache::new();
    render_once(&args, &mut cache, printer)?;

    if args.watch {
        watch(&args, &mut cache, printer)?;
    }

    Ok(())
}

/// Render once, reusing images already in `cache`. Returns the output path.
pub fn render_once(args: &RenderArgs, cache: &mut ImageCache, printer: &Printer) -> Result<PathBuf> {
    let mut config = config::load(&args.config)?;
    if args.preset_filter {
        config = config.filter_by_preset();
    }
    let selection = selection_from_args(&config, args.selection.as_deref(), &args.select)?;

    let mut report = validate_config(&config);
    report.merge(validate_selection(&config, &selection));
    if report.has_errors() {
        print_diagnostics(printer, &report);
        return Err(AvatarError::Validation {
            message: format!("{} is not valid", display_path(&args.config)),
            help: Some("Run `avakit validate` for details".to_string()),
        });
    }
    for diagnostic in report.iter() {
        printer.diagnostic(diagnostic);
    }

    let composition = Composition::from_config(&config)?;
    let mut export = composition.export.clone();
    if let Some(format) = args
        .format
        .or_else(|| args.output.as_deref().and_then(format_from_path))
    {
        export.format = format;
    }
    if let Some(scale) = args.scale {
        export.scale = scale;
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config_dir(&args.config).join(format!("avatar.{}", export.format.extension())));

    printer.status(
        "Rendering",
        &format!("{} ({}x{})", display_path(&args.config), composition.width, composition.height),
    );

    let compositor = Compositor::new(&composition);
    let urls = compositor.required_urls(&selection)?;
    let loader = FileLoader::new(config_dir(&args.config));
    let loaded = cache.ensure_loaded(&urls, &loader)?;
    if loaded > 0 {
        printer.info("Loaded", &plural(loaded, "sheet", "sheets"));
    }

    let mut canvas = compositor.canvas();
    let outcome = compositor.render(&selection, cache, &mut canvas)?;
    for warning in &outcome.warnings {
        printer.diagnostic(warning);
    }

    let encoded = encode(canvas.image(), &export)?;
    write_image(&encoded, &output)?;

    if args.data_url {
        println!("{}", encoded.to_data_url());
    }

    printer.status(
        "Finished",
        &format!(
            "{} ({}x{} {}, {})",
            display_path(&output),
            encoded.width,
            encoded.height,
            encoded.format,
            plural(outcome.draws.len(), "part", "parts")
        ),
    );

    Ok(output)
}

/// Re-render on changes until the watcher stops.
fn watch(args: &RenderArgs, cache: &mut ImageCache, printer: &Printer) -> Result<()> {
    let mut files = vec![args.config.clone()];
    files.extend(args.selection.clone());
    let watched: Vec<PathBuf> = files.iter().map(|f| canonical(f)).collect();

    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = notify::recommended_watcher(tx).map_err(|e| watch_error(&args.config, e))?;

    // Watch directories: editors often replace files rather than write them.
    let mut dirs: Vec<PathBuf> = Vec::new();
    for file in &files {
        let dir = config_dir(file);
        if !dirs.contains(&dir) {
            watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|e| watch_error(&dir, e))?;
            dirs.push(dir);
        }
    }

    printer.info("Watching", &plural(files.len(), "file", "files"));

    while let Ok(event) = rx.recv() {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                printer.error("error", &e.to_string());
                continue;
            }
        };

        let relevant = (event.kind.is_modify() || event.kind.is_create())
            && event.paths.iter().any(|p| is_watched(p, &watched));
        if !relevant {
            continue;
        }

        // Coalesce the burst of events a single save produces
        while rx.recv_timeout(Duration::from_millis(50)).is_ok() {}

        if let Err(e) = render_once(args, cache, printer) {
            printer.error("error", &e.to_string());
        }
    }

    Ok(())
}

/// Whether an event path is one of the (canonical) watched files.
fn is_watched(path: &Path, watched: &[PathBuf]) -> bool {
    let path = canonical(path);
    watched.iter().any(|w| *w == path)
}

/// Canonical form of a path whose file may be mid-replace: the parent
/// directory is resolved even when the file itself is missing.
fn canonical(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.file_name(), fs::canonicalize(config_dir(path))) {
        (Some(name), Ok(dir)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn watch_error(path: &Path, e: notify::Error) -> AvatarError {
    AvatarError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to watch: {}", e),
    }
}

/// Directory that relative sheet URLs are resolved against.
fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn format_from_path(path: &Path) -> Option<ImageFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AvatarConfig, PartDescriptor, Preset, SpriteSheetDescriptor};
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn args(config: PathBuf) -> RenderArgs {
        RenderArgs {
            config,
            selection: None,
            select: Vec::new(),
            output: None,
            format: None,
            scale: None,
            data_url: false,
            preset_filter: false,
            watch: false,
        }
    }

    fn project(dir: &Path) -> PathBuf {
        RgbaImage::from_pixel(8, 4, Rgba([200, 10, 10, 255]))
            .save(dir.join("heads.png"))
            .unwrap();
        let config = AvatarConfig::new(
            8,
            8,
            vec![PartDescriptor::new("head", SpriteSheetDescriptor::new("heads.png", 4, 4, 2, 1))],
        );
        let path = dir.join("avatar.json");
        config::save(&config, &path).unwrap();
        path
    }

    #[test]
    fn test_render_writes_png_next_to_config() {
        let dir = tempdir().unwrap();
        let config = project(dir.path());

        let mut cache = ImageCache::new();
        let output = render_once(&args(config), &mut cache, &Printer::new()).unwrap();

        assert_eq!(output, dir.path().join("avatar.png"));
        let image = image::open(&output).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (8, 8));
        // Head is 4x4, anchored top-centre
        assert_eq!(image.get_pixel(2, 0).0, [200, 10, 10, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_render_overrides() {
        let dir = tempdir().unwrap();
        let config = project(dir.path());

        let mut render_args = args(config);
        render_args.output = Some(dir.path().join("out.webp"));
        render_args.scale = Some(2.0);
        render_args.select = vec!["head=1".to_string()];

        let output = render_once(&render_args, &mut ImageCache::new(), &Printer::new()).unwrap();
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(image::load_from_memory(&bytes).unwrap().width(), 16);
    }

    #[test]
    fn test_render_missing_sheet_is_load_failure() {
        let dir = tempdir().unwrap();
        let config = AvatarConfig::new(
            8,
            8,
            vec![PartDescriptor::new("head", SpriteSheetDescriptor::new("nope.png", 4, 4, 1, 1))],
        );
        let path = dir.path().join("avatar.json");
        config::save(&config, &path).unwrap();

        let result = render_once(&args(path), &mut ImageCache::new(), &Printer::new());
        assert!(matches!(result, Err(AvatarError::LoadFailure { .. })));
        assert!(!dir.path().join("avatar.png").exists());
    }

    #[test]
    fn test_render_rejects_invalid_config() {
        let dir = tempdir().unwrap();
        let config = AvatarConfig::new(
            8,
            8,
            vec![PartDescriptor::new("head", SpriteSheetDescriptor::new("x.png", 4, 4, 0, 1))],
        );
        let path = dir.path().join("avatar.json");
        config::save(&config, &path).unwrap();

        let result = render_once(&args(path), &mut ImageCache::new(), &Printer::new());
        assert!(matches!(result, Err(AvatarError::Validation { .. })));
    }

    #[test]
    fn test_render_rejects_oversized_scale() {
        let dir = tempdir().unwrap();
        let mut render_args = args(project(dir.path()));
        render_args.scale = Some(1e12);

        let result = render_once(&render_args, &mut ImageCache::new(), &Printer::new());
        assert!(matches!(result, Err(AvatarError::Export { .. })));
    }

    #[test]
    fn test_preset_filter_is_opt_in() {
        let dir = tempdir().unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([0, 200, 0, 255]))
            .save(dir.path().join("hair.png"))
            .unwrap();
        project(dir.path());
        let path = dir.path().join("avatar.json");
        let mut config = config::load(&path).unwrap();
        config
            .parts
            .push(PartDescriptor::new("hair", SpriteSheetDescriptor::new("hair.png", 4, 4, 1, 1)).z_index(1));
        config::save(&config.apply_preset(Preset::RpgAvatar), &path).unwrap();

        let output = render_once(&args(path.clone()), &mut ImageCache::new(), &Printer::new()).unwrap();
        let image = image::open(&output).unwrap().to_rgba8();
        assert_eq!(image.get_pixel(2, 0).0, [0, 200, 0, 255]);

        let mut filtered = args(path);
        filtered.preset_filter = true;
        let output = render_once(&filtered, &mut ImageCache::new(), &Printer::new()).unwrap();
        let image = image::open(&output).unwrap().to_rgba8();
        assert_eq!(image.get_pixel(2, 0).0, [200, 10, 10, 255]);
    }

    #[test]
    fn test_is_watched_compares_full_paths() {
        let dir = tempdir().unwrap();
        let (a, b) = (dir.path().join("a"), dir.path().join("b"));
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("selection.json"), "{}").unwrap();
        std::fs::write(b.join("selection.json"), "{}").unwrap();

        let watched = vec![canonical(&a.join("selection.json"))];
        assert!(is_watched(&a.join("selection.json"), &watched));
        assert!(is_watched(&a.join("../a/selection.json"), &watched));
        assert!(!is_watched(&b.join("selection.json"), &watched));
        // A file being replaced still resolves through its directory
        assert_eq!(canonical(&a.join("gone.json")), canonical(&a).join("gone.json"));
    }

    #[test]
    fn test_config_dir() {
        assert_eq!(config_dir(Path::new("avatar.json")), PathBuf::from("."));
        assert_eq!(config_dir(Path::new("a/avatar.json")), PathBuf::from("a"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(format_from_path(Path::new("x.JPG")), Some(ImageFormat::Jpeg));
        assert_eq!(format_from_path(Path::new("x.gif")), None);
    }
}
