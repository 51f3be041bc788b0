use futures::executor::block_on;
use overflow_audit::{
    AutoResizePolicy, BoxGeometry, EngineOptions, FontLoader, FontName, NodeId, OverflowEngine,
};
use overflow_audit_scene::{SceneDocument, SceneFontLibrary, SceneStyle};

pub fn inter() -> FontName {
    FontName::default()
}

pub fn inter_bold() -> FontName {
    FontName::new("Inter", "Bold")
}

/// Face referenced by designs but never installed.
pub fn brand_font() -> FontName {
    FontName::new("Brand Sans", "Black")
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

/// Library with Inter Regular and Bold installed, nothing loaded yet.
pub fn library() -> SceneFontLibrary {
    SceneFontLibrary::with_fonts([inter(), inter_bold()])
}

pub fn document(fonts: &SceneFontLibrary) -> SceneDocument {
    SceneDocument::new(fonts.clone())
}

pub fn engine(fonts: &SceneFontLibrary) -> OverflowEngine<SceneFontLibrary> {
    OverflowEngine::new(fonts.clone(), EngineOptions::default())
}

pub fn load(fonts: &SceneFontLibrary, font: &FontName) {
    block_on(fonts.load_font(font)).expect("fixture font should load");
}

/// Root-level text node in Inter Regular.
pub fn label(
    doc: &mut SceneDocument,
    text: &str,
    size: f32,
    policy: AutoResizePolicy,
    geometry: BoxGeometry,
) -> NodeId {
    doc.add_text(
        None,
        "label",
        text,
        SceneStyle::new(inter(), size),
        policy,
        geometry,
    )
}
