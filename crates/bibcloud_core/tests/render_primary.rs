use bibcloud_core::render::font::FontFace;
use bibcloud_core::render::layout::{spiral_layout, LayoutItem};
use bibcloud_core::{render_cloud, RenderMethod, RenderSettings, RenderTargets, TermFrequencies};
use std::fs;

fn selection() -> Vec<(String, u64)> {
    let words = [
        "learning", "neural", "network", "graph", "model", "training", "vision", "language",
        "transformer", "attention", "embedding", "dataset", "benchmark", "robust", "sparse",
        "kernel", "gradient", "optimizer", "retrieval", "clustering", "inference", "latent",
        "diffusion", "policy", "reward", "agent", "signal", "spectral", "tensor", "memory",
    ];
    words
        .iter()
        .enumerate()
        .map(|(rank, word)| (word.to_string(), (40 - rank) as u64))
        .collect()
}

fn intersects(a: &LayoutItem, b: &LayoutItem) -> bool {
    let (ax, ay) = a.position;
    let (bx, by) = b.position;
    ax < bx + b.extent.width
        && bx < ax + a.extent.width
        && ay < by + b.extent.height
        && by < ay + a.extent.height
}

/// Outline face from the default candidates, if this machine has one.
fn outline_face(settings: &RenderSettings) -> Option<FontFace> {
    FontFace::load_outline(&settings.font_candidates)
}

#[test]
fn spiral_placements_do_not_overlap() {
    let settings = RenderSettings::default();
    let face = FontFace::resolve(&[]);
    let items = spiral_layout(&selection(), &face, &settings);

    assert!(!items.is_empty());
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            assert!(!intersects(a, b), "`{}` overlaps `{}`", a.word, b.word);
        }
    }
}

#[test]
fn spiral_placements_stay_inside_canvas() {
    let settings = RenderSettings {
        width: 600,
        height: 300,
        ..RenderSettings::default()
    };
    let face = FontFace::resolve(&[]);
    let items = spiral_layout(&selection(), &face, &settings);

    assert!(!items.is_empty());
    for item in &items {
        let (x, y) = item.position;
        assert!(x + item.extent.width <= settings.width, "{item:?}");
        assert!(y + item.extent.height <= settings.height, "{item:?}");
    }
}

#[test]
fn spiral_sizes_never_grow_down_the_ranking() {
    let settings = RenderSettings::default();
    let face = FontFace::resolve(&[]);
    let items = spiral_layout(&selection(), &face, &settings);

    assert!(items.len() > 1);
    assert!(items[0].font_size <= settings.max_font_size);
    for pair in items.windows(2) {
        assert!(pair[1].font_size <= pair[0].font_size, "{pair:?}");
    }
    assert!(items.iter().all(|item| item.font_size >= 10));
}

#[test]
fn spiral_layout_of_nothing_is_empty() {
    let face = FontFace::resolve(&[]);
    assert!(spiral_layout(&[], &face, &RenderSettings::default()).is_empty());
}

#[test]
fn outline_font_renders_with_spiral_layout() {
    let settings = RenderSettings::default();
    let Some(face) = outline_face(&settings) else {
        return;
    };

    let items = spiral_layout(&selection(), &face, &settings);
    assert!(!items.is_empty());
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            assert!(!intersects(a, b), "`{}` overlaps `{}`", a.word, b.word);
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let targets = RenderTargets {
        raster: dir.path().join("nube_palabras.png"),
        vector: dir.path().join("nube_palabras.pdf"),
    };
    let frequencies: TermFrequencies = selection()
        .iter()
        .map(|(word, count)| (word.as_str(), *count))
        .collect();

    let report = render_cloud(&frequencies, &settings, &targets);
    assert!(report.is_success(), "{:?}", report.error);
    assert_eq!(report.method, RenderMethod::SpiralLayout);
    assert!(report.items_drawn > 0);
    assert_ne!(report.font.as_deref(), Some("builtin"));

    let image = image::open(&targets.raster).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (settings.width, settings.height));
    assert!(image.pixels().any(|pixel| pixel.0 != [255, 255, 255]));
    if let Some(vector) = &report.vector_path {
        assert!(fs::read(vector).unwrap().starts_with(b"%PDF"));
    }
}
