mod common;

use common::fixtures::{approx, document, inter, library};
use common::translators::{FailingTranslator, StaticTranslator};
use futures::executor::block_on;
use overflow_audit::{
    scan_text_nodes, AuditMode, AuditOptions, Auditor, AutoResizePolicy, BoxGeometry, ErrorPhase,
    NodeId, SeverityFilter, SeverityTier, TextNodeInfo,
};
use overflow_audit_scene::{SceneDocument, SceneFontLibrary, SceneStyle};

struct Screen {
    doc: SceneDocument,
    fonts: SceneFontLibrary,
    roots: Vec<NodeId>,
}

/// A card with a fixed-width button label and a growing caption.
fn screen() -> Screen {
    let fonts = library();
    let mut doc = document(&fonts);
    let card = doc.add_frame(None, "Checkout", BoxGeometry::new(300.0, 200.0));
    doc.set_padding(&card, 20.0, 20.0).expect("card is a frame");
    doc.add_text(
        Some(&card),
        "Button label",
        "Save",
        SceneStyle::new(inter(), 20.0),
        AutoResizePolicy::None,
        BoxGeometry::new(100.0, 24.0),
    );
    doc.add_text(
        Some(&card),
        "Caption",
        "Total",
        SceneStyle::new(inter(), 10.0),
        AutoResizePolicy::WidthAndHeight,
        BoxGeometry::default(),
    );
    let roots = doc.roots().to_vec();
    Screen { doc, fonts, roots }
}

fn options(locales: &[&str]) -> AuditOptions {
    AuditOptions::default().with_target_locales(locales.iter().copied())
}

#[test]
fn scan_collects_text_leaves_depth_first() {
    let fonts = library();
    let mut doc = document(&fonts);
    let page = doc.add_frame(None, "Home", BoxGeometry::new(400.0, 400.0));
    let nav = doc.add_frame(Some(&page), "Nav", BoxGeometry::new(400.0, 40.0));
    doc.add_shape(Some(&nav), "Divider", BoxGeometry::new(400.0, 1.0));
    let mixed = doc.add_text(
        Some(&nav),
        "Menu",
        "Menu",
        SceneStyle::new(inter(), 12.0),
        AutoResizePolicy::None,
        BoxGeometry::new(60.0, 14.0),
    );
    doc.restyle(&mixed, 0..1, SceneStyle::new(inter(), 18.0))
        .expect("restyle should succeed");
    doc.add_text(
        Some(&page),
        "Title",
        "Welcome",
        SceneStyle::new(inter(), 24.0),
        AutoResizePolicy::None,
        BoxGeometry::new(200.0, 29.0),
    );
    let orphan = doc.add_text(
        None,
        "Footnote",
        "v1.0",
        SceneStyle::new(inter(), 8.0),
        AutoResizePolicy::Height,
        BoxGeometry::new(40.0, 10.0),
    );

    let nodes = scan_text_nodes(&doc, &[page, orphan], 14.0);
    let names: Vec<&str> = nodes.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, ["Menu", "Title", "Footnote"]);
    assert_eq!(nodes[0].font_size, 14.0);
    assert_eq!(nodes[0].parent_name, "Nav");
    assert_eq!(nodes[1].font_size, 24.0);
    assert_eq!(nodes[1].original_text, "Welcome");
    assert_eq!(nodes[2].parent_name, "Page");
    assert_eq!(nodes[2].auto_resize, AutoResizePolicy::Height);
}

#[test]
fn measured_audit_reports_every_node_per_locale() {
    let Screen {
        mut doc,
        fonts,
        roots,
    } = screen();
    let before = doc.node_count();
    let mut auditor = Auditor::new(fonts.clone(), options(&["de", "ar"]));
    let nodes = auditor.scan(&doc, &roots);
    let translator = StaticTranslator::new()
        .with("de", &["Speichern", "Gesamtbetrag inklusive Steuern und Versand mit Gutschein"])
        .with("ar", &["حفظ", "المجموع"]);

    let report = block_on(auditor.run(&mut doc, &translator, &nodes)).expect("audit should run");

    assert_eq!(report.results.len(), 4);
    assert_eq!(*translator.calls.borrow(), ["de", "ar"]);
    let de_label = &report.results[0];
    assert_eq!(de_label.locale, "de");
    assert_eq!(de_label.translated_text, "Speichern");
    assert!(approx(de_label.overflow_amount, 8.0));
    assert_eq!(de_label.severity, SeverityTier::Warning);
    assert!(!de_label.is_rtl);
    assert_eq!(de_label.parent_name, "Checkout");

    // 56 glyphs at 6 units against 260 of content width.
    let de_caption = &report.results[1];
    assert!(approx(de_caption.overflow_amount, 76.0));
    assert_eq!(de_caption.severity, SeverityTier::Critical);

    let ar_label = &report.results[2];
    assert!(ar_label.is_rtl);
    assert!(!ar_label.is_overflow);
    assert_eq!(ar_label.severity, SeverityTier::None);

    assert_eq!(report.overflow_count(), 2);
    assert_eq!(report.critical_count(), 1);
    assert_eq!(report.safe_count(), 2);
    assert_eq!(report.overflowing_locales(), ["de"]);
    assert_eq!(report.summary(), "2 overflow(s) found across 1 locale(s)");
    assert_eq!(doc.node_count(), before);
    assert_eq!(fonts.load_calls(&inter()), 1);
}

#[test]
fn missing_translations_keep_source_text() {
    let Screen {
        mut doc,
        fonts,
        roots,
    } = screen();
    let mut auditor = Auditor::new(fonts, options(&["fr"]));
    let nodes = auditor.scan(&doc, &roots);
    let translator = StaticTranslator::new().with_partial("fr", &[(1, "Totale")]);

    let report = block_on(auditor.run(&mut doc, &translator, &nodes)).expect("audit should run");
    let texts: Vec<&str> = report
        .results
        .iter()
        .map(|result| result.translated_text.as_str())
        .collect();
    assert_eq!(texts, ["Save", "Totale"]);
    assert!(report.results.iter().all(|result| !result.is_overflow));
}

#[test]
fn translation_failure_aborts_the_run() {
    let Screen {
        mut doc,
        fonts,
        roots,
    } = screen();
    let mut auditor = Auditor::new(fonts, options(&["de", "ja"]));
    let nodes = auditor.scan(&doc, &roots);
    let translator = FailingTranslator {
        failing_locale: "ja".to_string(),
    };

    let err = block_on(auditor.run(&mut doc, &translator, &nodes))
        .expect_err("ja translation should abort the run");
    assert_eq!(err.phase, ErrorPhase::Translate);
    assert_eq!(err.code, "TRANSLATE_TRANSPORT");
    assert_eq!(err.locale.as_deref(), Some("ja"));
}

#[test]
fn heuristic_audit_never_touches_the_host() {
    let Screen {
        mut doc,
        fonts,
        roots,
    } = screen();
    let mut auditor = Auditor::new(
        fonts.clone(),
        options(&["de"]).with_mode(AuditMode::Heuristic),
    );
    let nodes = auditor.scan(&doc, &roots);
    let translator = StaticTranslator::new().with("de", &["Speichern", "Summe"]);

    let report = block_on(auditor.run(&mut doc, &translator, &nodes)).expect("audit should run");

    // 9/4 * 1.35 * 100
    assert!(approx(report.results[0].overflow_amount, 203.75));
    assert_eq!(report.results[0].severity, SeverityTier::Critical);
    assert_eq!(fonts.total_load_calls(), 0);
}

#[test]
fn failed_measurement_is_reported_as_fitting() {
    let Screen {
        mut doc,
        fonts,
        roots,
    } = screen();
    let mut auditor = Auditor::new(fonts, options(&["de"]));
    let nodes = auditor.scan(&doc, &roots);
    doc.fail_duplication(&nodes[0].id).expect("node exists");
    let translator = StaticTranslator::new().with("de", &["Speichern unter", "Summe"]);

    let report = block_on(auditor.run(&mut doc, &translator, &nodes)).expect("audit should run");
    let defaulted = &report.results[0];
    assert!(!defaulted.is_overflow);
    assert_eq!(defaulted.severity, SeverityTier::None);
    let message = defaulted
        .measurement_error
        .as_deref()
        .expect("error should be kept");
    assert!(message.contains("MEASURE_DUPLICATE_FAILED"));
    assert!(report.results[1].measurement_error.is_none());
}

#[test]
fn empty_inputs_are_rejected() {
    let Screen {
        mut doc,
        fonts,
        roots,
    } = screen();
    let translator = StaticTranslator::new();

    let mut auditor = Auditor::new(fonts.clone(), options(&["de"]));
    let err = block_on(auditor.run(&mut doc, &translator, &[])).expect_err("no nodes");
    assert_eq!(err.code, "SCAN_EMPTY");

    let mut auditor = Auditor::new(fonts, options(&[]));
    let nodes: Vec<TextNodeInfo> = auditor.scan(&doc, &roots);
    let err = block_on(auditor.run(&mut doc, &translator, &nodes)).expect_err("no locales");
    assert_eq!(err.code, "AUDIT_NO_LOCALES");
    assert!(translator.calls.borrow().is_empty());
}

#[test]
fn report_filters_overflows_by_locale_and_tier() {
    let Screen {
        mut doc,
        fonts,
        roots,
    } = screen();
    let mut auditor = Auditor::new(fonts, options(&["de", "ru"]));
    let nodes = auditor.scan(&doc, &roots);
    let translator = StaticTranslator::new()
        .with("de", &["Speichern", "Summe"])
        .with("ru", &["Сохранить как", "Итого"]);

    let report = block_on(auditor.run(&mut doc, &translator, &nodes)).expect("audit should run");

    assert_eq!(report.filter(None, SeverityFilter::All).len(), 2);
    let critical = report.filter(None, SeverityFilter::Critical);
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].locale, "ru");
    let de_warnings = report.filter(Some("de"), SeverityFilter::Warning);
    assert_eq!(de_warnings.len(), 1);
    assert!(report.filter(Some("de"), SeverityFilter::Critical).is_empty());
    assert_eq!(report.overflowing_locales(), ["de", "ru"]);
}
