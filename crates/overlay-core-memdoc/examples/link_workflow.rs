//! Link workflow example
//!
//! Drives the bubble toolbar and the link editor against the in-memory engine and prints the
//! panel states a host would render.

use overlay_core::{
    ElementId, FloatingOverlays, LinkEditorActions, LinkEditorProps, LinkEditorRenderer,
    OverlayConfig, OverlayElements, PanelSizes,
};
use overlay_core_memdoc::{DocPosition, MemoryEngine};

struct PrintRenderer;

impl LinkEditorRenderer for PrintRenderer {
    fn render(&mut self, props: &LinkEditorProps) {
        println!(
            "  link editor: {:?} url={:?} edited={:?} submit={} [{}]",
            props.status,
            props.link_url,
            props.edited_url,
            props.can_submit,
            props.visual.to_inline_style()
        );
    }
}

fn main() {
    println!("=== Floating overlay example ===\n");

    let mut engine = MemoryEngine::new(
        "Overlay panels follow the selection.\nRead the [guide](https://docs.rs) or www.rust-lang.org",
    );
    let detected = engine.detect_auto_links();
    println!("1. Auto-links detected: {}", detected);

    let mut overlays = FloatingOverlays::attach(
        &mut engine,
        OverlayConfig::default(),
        OverlayElements {
            bubble: ElementId(2),
            link: ElementId(3),
            link_input: ElementId(4),
        },
        PanelSizes {
            bubble: (200.0, 36.0),
            link: (280.0, 44.0),
        },
    );
    let mut renderer = PrintRenderer;

    println!("\n2. Select \"selection\":");
    engine.select_text("selection");
    println!("  bubble: [{}]", overlays.bubble_state().to_inline_style());

    println!("\n3. Insert a link:");
    overlays.insert_link(&mut engine);
    if let Some(input) = overlays.take_focus_request() {
        println!("  focus requested for element {}", input.element.0);
    }
    overlays.render_link(&mut renderer);

    println!("\n4. Submit an invalid, then a valid URL:");
    overlays.set_edited_url("not a url");
    println!("  outcome: {:?}", overlays.submit_link(&mut engine));
    overlays.set_edited_url("https://example.com/overlays");
    println!("  outcome: {:?}", overlays.submit_link(&mut engine));
    overlays.render_link(&mut renderer);

    println!("\n5. Caret inside the existing link:");
    if let Some((start, _)) = engine.document().find("guide") {
        engine.set_caret(DocPosition::new(start.block, start.offset + 2));
    }
    overlays.render_link(&mut renderer);

    println!("\n6. Escape closes it:");
    engine.press_escape();
    overlays.render_link(&mut renderer);

    println!("\n7. Document text: {:?}", engine.document().text());
    for link in engine.document().links() {
        println!("  link {:?} -> {}", link.kind, link.url());
    }

    overlays.detach(&mut engine);
    println!("\nListeners after detach: {}", engine.listener_count());
}
