use criterion::{Criterion, black_box, criterion_group, criterion_main};
use overlay_core::{
    AnchorFrame, GeometryConfig, GeometryEngine, LinkSession, OverlayVisualState, PositionRequest,
    Rect, TextAlignment, is_submittable, sanitize_url,
};

fn targets(count: usize) -> Vec<Rect> {
    (0..count)
        .map(|i| {
            let i = i as f64;
            Rect::new((i * 37.0) % 900.0, (i * 53.0) % 700.0 - 50.0, 80.0, 18.0)
        })
        .collect()
}

fn bench_compute_position(c: &mut Criterion) {
    let engine = GeometryEngine::new(GeometryConfig::default());
    let anchor = AnchorFrame::new(
        Rect::new(12.0, -300.0, 776.0, 4000.0),
        Rect::new(0.0, 0.0, 800.0, 600.0),
    );
    let panel = Rect::new(0.0, 0.0, 240.0, 44.0);
    let rects = targets(1_000);

    c.bench_function("compute_position/1k_targets", |b| {
        b.iter(|| {
            let mut visible = 0usize;
            for (i, target) in rects.iter().enumerate() {
                let request = PositionRequest {
                    target_rect: Some(*target),
                    vertical_gap: 10.0,
                    horizontal_offset: 5.0,
                    is_link_flip: i % 2 == 0,
                    text_alignment: if i % 3 == 0 {
                        TextAlignment::End
                    } else {
                        TextAlignment::Start
                    },
                };
                let state: OverlayVisualState =
                    engine.compute(black_box(&request), &panel, &anchor);
                visible += usize::from(state.is_visible());
            }
            black_box(visible);
        })
    });
}

fn bench_url_checks(c: &mut Criterion) {
    let urls = [
        "https://example.com/path?q=1",
        "mailto:someone@example.com",
        "javascript:alert(1)",
        "example.com",
        "https://",
    ];
    c.bench_function("url/validate_and_sanitize", |b| {
        b.iter(|| {
            for url in urls {
                black_box(is_submittable(black_box(url)));
                black_box(sanitize_url(black_box(url)));
            }
        })
    });
}

fn bench_session_edit_cycle(c: &mut Criterion) {
    c.bench_function("link_session/edit_cycle", |b| {
        b.iter(|| {
            let mut session = LinkSession::new();
            for i in 0..100 {
                session.set_edited_url(format!("https://example.com/{i}"));
                black_box(session.can_submit());
            }
            black_box(session.status());
        })
    });
}

criterion_group!(
    benches,
    bench_compute_position,
    bench_url_checks,
    bench_session_edit_cycle
);
criterion_main!(benches);
