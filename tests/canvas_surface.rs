use std::sync::Arc;

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use photo_annotate::renderer::encode_png;
use photo_annotate::{
    CanvasConfig, CanvasSurface, ImageFetcher, LoadJob, ShapeKind, SurfaceEvent,
};

/// Keeps every job so the test decides when, and in what order, loads finish
#[derive(Default)]
struct ManualFetcher {
    jobs: Mutex<Vec<LoadJob>>,
}

impl ManualFetcher {
    fn take(&self, url: &str) -> LoadJob {
        let mut jobs = self.jobs.lock();
        let index = jobs
            .iter()
            .position(|job| job.url() == url)
            .unwrap_or_else(|| panic!("no pending job for {url}"));
        jobs.remove(index)
    }
}

impl ImageFetcher for ManualFetcher {
    fn fetch(&self, job: LoadJob) {
        self.jobs.lock().push(job);
    }
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
}

fn mount() -> (CanvasSurface, Arc<ManualFetcher>) {
    let fetcher = Arc::new(ManualFetcher::default());
    let surface = CanvasSurface::new(CanvasConfig::default(), fetcher.clone());
    (surface, fetcher)
}

#[test]
fn test_decode_finishing_after_teardown_is_discarded() {
    let (mut surface, fetcher) = mount();
    surface.add_shape(ShapeKind::Rectangle).unwrap();
    surface.load_image(Some("mem://slow")).unwrap();
    let version = surface.scene().version();
    let len = surface.scene().len();

    surface.teardown();
    let delivered = fetcher.take("mem://slow").complete(Ok(png(800, 400, [0, 0, 0, 255])));

    assert!(!delivered, "channel should be closed after teardown");
    assert_eq!(surface.poll_loads(), 0);
    assert_eq!(surface.scene().version(), version);
    assert_eq!(surface.scene().len(), len);
}

#[test]
fn test_decode_finishing_after_drop_does_not_panic() {
    let (mut surface, fetcher) = mount();
    surface.load_image(Some("mem://dropped")).unwrap();
    drop(surface);

    assert!(!fetcher.take("mem://dropped").complete(Ok(png(10, 10, [1, 1, 1, 255]))));
}

#[test]
fn test_superseded_load_cannot_land_even_if_it_finishes_last() {
    let (mut surface, fetcher) = mount();
    surface.load_image(Some("mem://first")).unwrap();
    surface.load_image(Some("mem://second")).unwrap();

    // second finishes first, then the stale first one arrives
    fetcher.take("mem://second").complete(Ok(png(1000, 500, [0, 255, 0, 255])));
    fetcher.take("mem://first").complete(Ok(png(500, 500, [255, 0, 0, 255])));
    assert_eq!(surface.poll_loads(), 1);

    let summary = surface.scene().layer_summary();
    assert_eq!(summary.len(), 1);
    let image = surface.scene().objects()[0].element.as_image().unwrap();
    assert_eq!(image.source(), "mem://second");
    assert_eq!((image.rendered_width(), image.rendered_height()), (400, 200));
}

#[test]
fn test_reload_replaces_previous_content() {
    let (mut surface, fetcher) = mount();
    surface.load_image(Some("mem://a")).unwrap();
    fetcher.take("mem://a").complete(Ok(png(100, 100, [9, 9, 9, 255])));
    surface.poll_loads();
    surface.add_text().unwrap();
    surface.add_shape(ShapeKind::Circle).unwrap();
    assert_eq!(surface.scene().len(), 3);

    surface.load_image(Some("mem://b")).unwrap();
    assert!(surface.scene().is_empty());
    fetcher.take("mem://b").complete(Ok(png(100, 100, [9, 9, 9, 255])));
    surface.poll_loads();

    assert_eq!(surface.scene().len(), 1);
    assert_eq!(surface.scene().layer_summary().entries()[0].kind, "image");
}

#[test]
fn test_events_report_load_lifecycle_and_teardown() {
    let (mut surface, fetcher) = mount();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    surface.subscribe(Box::new(move |event: &SurfaceEvent| {
        if !matches!(event, SurfaceEvent::Scene(_)) {
            sink.lock().push(event.clone());
        }
    }));

    let epoch = surface.load_image(Some("mem://x")).unwrap();
    fetcher.take("mem://x").complete(Ok(png(20, 20, [0, 0, 0, 255])));
    surface.poll_loads();
    surface.teardown();
    surface.teardown();

    assert_eq!(
        *seen.lock(),
        vec![
            SurfaceEvent::ImageLoadStarted { url: "mem://x".to_owned(), epoch },
            SurfaceEvent::ImageLoaded { url: "mem://x".to_owned(), epoch },
            SurfaceEvent::TornDown,
        ]
    );
}

#[test]
fn test_export_has_text_painted_over_rectangle() {
    let (mut surface, _) = mount();
    surface.add_shape(ShapeKind::Rectangle).unwrap();
    surface.add_text().unwrap();

    let png = surface.export_png().unwrap();
    let exported = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(exported.dimensions(), (500, 500));

    // lightgray background outside every object
    assert_eq!(exported.get_pixel(5, 5).0, [0xd3, 0xd3, 0xd3, 255]);
    // lower part of the rectangle, below the text line
    assert_eq!(exported.get_pixel(210, 170).0, [0, 0, 255, 255]);

    // dark glyph pixels inside the rectangle: the text sits on top
    let mut dark = 0;
    for y in 100..130 {
        for x in 100..220 {
            let [r, g, b, _] = exported.get_pixel(x, y).0;
            if r < 80 && g < 80 && b < 80 {
                dark += 1;
            }
        }
    }
    assert!(dark > 50, "expected glyph pixels over the rectangle, found {dark}");
}

#[test]
fn test_export_matches_what_is_displayed() {
    let (mut surface, _) = mount();
    surface.add_shape(ShapeKind::Triangle).unwrap();
    let displayed = surface.render();
    let exported = image::load_from_memory(&surface.export_png().unwrap())
        .unwrap()
        .to_rgba8();
    assert_eq!(*displayed, exported);
}
