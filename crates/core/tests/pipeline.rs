use std::{
    fs::write,
    path::Path,
    sync::{Arc, Mutex},
};

use fontbuild_core::{
    BuildOptions, FontProject, FontSource, InstanceOptions, ProjectConfig, Resources, Toolchain,
    build,
};
use fontbuild_font_curves::CurveConverter;
use fontbuild_font_model::{Component, Contour, ContourPoint, Font, Glyph, load_ufo, save_ufo};
use fontbuild_glyph_ops::{
    CodepointMap, Decomposer, GlyphGenerator, ItalicParams, Italicizer, OverlapResolver,
};
use read_fonts::{
    FontRef, TableProvider,
    tables::{head::MacStyle, os2::SelectionFlags},
};

fn square(x: f64, size: f64) -> Contour {
    Contour::new(vec![
        ContourPoint::line(x, 0.0),
        ContourPoint::line(x + size, 0.0),
        ContourPoint::line(x + size, size),
        ContourPoint::line(x, size),
    ])
}

fn base_font() -> Font {
    ["A", "B", "C"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            Glyph::new(name)
                .with_width(500.0)
                .with_codepoint(char::from(b'A' + i as u8))
                .with_contour(square(50.0, 400.0))
        })
        .collect()
}

fn config(glyphs: &str) -> ProjectConfig {
    toml::from_str(&format!(
        "[main]\nfoundry = \"Test\"\nversion = \"1.000\"\n\n[glyphs]\n{glyphs}\n"
    ))
    .unwrap()
}

fn project(dir: &Path, glyphs: &str, toolchain: Toolchain) -> FontProject {
    FontProject::new(base_font(), dir, &config(glyphs), Resources::default(), toolchain)
}

/// Records every slant it is asked to apply without touching the glyph.
#[derive(Clone, Default)]
struct RecordingItalicizer(Arc<Mutex<Vec<(String, f64)>>>);

impl Italicizer for RecordingItalicizer {
    fn italicize(
        &self,
        glyph: &mut Glyph,
        angle: f64,
        _params: &ItalicParams,
    ) -> fontbuild_glyph_ops::Result<()> {
        self.0.lock().unwrap().push((glyph.name.clone(), angle));
        Ok(())
    }
}

/// Records the number of fonts in every conversion call.
#[derive(Clone, Default)]
struct RecordingConverter(Arc<Mutex<Vec<usize>>>);

impl CurveConverter for RecordingConverter {
    fn to_quadratic(
        &self,
        fonts: &mut [Font],
        _max_err_em: f64,
        _reverse_direction: bool,
    ) -> fontbuild_font_curves::Result<()> {
        self.0.lock().unwrap().push(fonts.len());
        Ok(())
    }
}

/// Counts union calls and keeps the contours as they are.
#[derive(Clone, Default)]
struct RecordingResolver(Arc<Mutex<usize>>);

impl OverlapResolver for RecordingResolver {
    fn union(&self, contours: &[Contour]) -> fontbuild_glyph_ops::Result<Vec<Contour>> {
        *self.0.lock().unwrap() += 1;
        Ok(contours.to_vec())
    }
}

type CallLog = Arc<Mutex<Vec<String>>>;

/// Logs each decomposed glyph and leaves its components in place.
struct LoggingDecomposer(CallLog);

impl Decomposer for LoggingDecomposer {
    fn decompose(&self, _font: &mut Font, name: &str) -> fontbuild_glyph_ops::Result<()> {
        self.0.lock().unwrap().push(format!("decompose {name}"));
        Ok(())
    }
}

/// Logs each rule without adding anything to the font.
struct LoggingGenerator(CallLog);

impl GlyphGenerator for LoggingGenerator {
    fn generate(
        &self,
        _font: &mut Font,
        rule: &str,
        _mapping: &CodepointMap,
    ) -> fontbuild_glyph_ops::Result<()> {
        self.0.lock().unwrap().push(format!("generate {rule}"));
        Ok(())
    }
}

#[test]
fn test_regular_instance_deletes_listed_glyphs() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = project(dir.path(), "delete = [\"C\"]", Toolchain::default());
    let base = project.base_font().clone();

    let path = project
        .generate_font(FontSource::Font(&base), "Test/Regular", &InstanceOptions::default())
        .unwrap();

    assert_eq!(project.queue().len(), 1);
    assert_eq!(project.queue().iter().next().unwrap().path, path);
    let saved = load_ufo(&path).unwrap();
    assert_eq!(saved.names(), ["A", "B"]);
    assert_eq!(saved.info.family_name.as_deref(), Some("Test"));
    assert_eq!(saved.info.postscript_font_name.as_deref(), Some("Test-Regular"));
}

#[test]
fn test_italic_instance_angles() {
    let dir = tempfile::tempdir().unwrap();
    let italicizer = RecordingItalicizer::default();
    let toolchain = Toolchain { italicizer: Box::new(italicizer.clone()), ..Toolchain::default() };
    let mut project = project(dir.path(), "lessitalic = [\"A\"]\nnoitalic = [\"B\"]", toolchain);
    let base = project.base_font().clone();

    let options = InstanceOptions { italic: true, ..InstanceOptions::default() };
    let path = project.generate_font(FontSource::Font(&base), "Test/Italic", &options).unwrap();

    let calls = italicizer.0.lock().unwrap().clone();
    assert_eq!(calls, [("A".to_string(), 9.0), ("C".to_string(), 10.0)]);

    let saved = load_ufo(path).unwrap();
    for name in ["A", "B", "C"] {
        assert_eq!(saved.glyph(name).unwrap().width, 510.0, "{name}");
    }
    assert!(saved.info.open_type_os2_selection.unwrap().contains(&9));
}

#[test]
fn test_placeholder_glyph_is_not_italicized() {
    let dir = tempfile::tempdir().unwrap();
    let italicizer = RecordingItalicizer::default();
    let toolchain = Toolchain { italicizer: Box::new(italicizer.clone()), ..Toolchain::default() };
    let mut project = project(dir.path(), "", toolchain);
    let mut base = project.base_font().clone();
    base.insert(Glyph::new("uniFFFD").with_width(600.0).with_contour(square(0.0, 600.0)));

    let options = InstanceOptions { italic: true, ..InstanceOptions::default() };
    let path = project.generate_font(FontSource::Font(&base), "Test/Italic", &options).unwrap();

    assert!(italicizer.0.lock().unwrap().iter().all(|(name, _)| name != "uniFFFD"));
    assert_eq!(load_ufo(path).unwrap().glyph("uniFFFD").unwrap().width, 600.0);
}

#[test]
fn test_suffix_swap() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = project(dir.path(), "", Toolchain::default());
    let mut base = project.base_font().clone();
    base.insert(Glyph::new("A.ss01").with_width(700.0).with_contour(square(0.0, 100.0)));

    let options = InstanceOptions { swap_suffixes: vec![".ss01".into()], ..Default::default() };
    let path = project.generate_font(FontSource::Font(&base), "Test/Regular", &options).unwrap();

    let saved = load_ufo(path).unwrap();
    assert_eq!(saved.glyph("A").unwrap().width, 700.0);
    assert_eq!(saved.glyph("A.ss01").unwrap().width, 500.0);
}

#[test]
fn test_features_come_from_base_font() {
    let dir = tempfile::tempdir().unwrap();
    let mut base = base_font();
    base.features = "languagesystem DFLT dflt;\nfeature liga { sub A B by C; } liga;\n".to_string();
    let mut project = FontProject::new(
        base.clone(),
        dir.path(),
        &config(""),
        Resources::default(),
        Toolchain::default(),
    );

    // The instance source has no features of its own.
    let source = base_font();
    let path = project
        .generate_font(FontSource::Font(&source), "Test/Regular", &InstanceOptions::default())
        .unwrap();

    assert_eq!(load_ufo(path).unwrap().features, base.features);
}

fn overlap_calls(compatible: bool) -> usize {
    let dir = tempfile::tempdir().unwrap();
    let resolver = RecordingResolver::default();
    let toolchain = Toolchain { resolver: Box::new(resolver.clone()), ..Toolchain::default() };
    let mut project = project(dir.path(), "", toolchain);
    project.compatible = compatible;
    let base = project.base_font().clone();

    project.generate_font(FontSource::Font(&base), "Test/Regular", &InstanceOptions::default()).unwrap();
    *resolver.0.lock().unwrap()
}

#[test]
fn test_compatible_build_keeps_overlaps() {
    assert_eq!(overlap_calls(true), 0);
    assert_eq!(overlap_calls(false), 3);
}

#[test]
fn test_predecompose_runs_before_glyph_generation() {
    let dir = tempfile::tempdir().unwrap();
    let log = CallLog::default();
    let toolchain = Toolchain {
        decomposer: Box::new(LoggingDecomposer(log.clone())),
        generator: Box::new(LoggingGenerator(log.clone())),
        ..Toolchain::default()
    };
    let resources = Resources { diacritics: vec!["Cacute=C+acute@top".into()], ..Resources::default() };
    let mut base = base_font();
    base.insert(Glyph::new("Aring").with_width(500.0).with_component(Component::at("A", 0.0, 0.0)));
    let mut project =
        FontProject::new(base.clone(), dir.path(), &config("predecompose = [\"Aring\"]"), resources, toolchain);

    project.generate_font(FontSource::Font(&base), "Test/Regular", &InstanceOptions::default()).unwrap();

    assert_eq!(*log.lock().unwrap(), ["decompose Aring", "generate Cacute=C+acute@top"]);
}

#[test]
fn test_style_bits_in_compiled_fonts() {
    let dir = tempfile::tempdir().unwrap();
    let toolchain =
        Toolchain { italicizer: Box::new(RecordingItalicizer::default()), ..Toolchain::default() };
    let mut project = project(dir.path(), "", toolchain);
    let base = project.base_font().clone();

    project.generate_font(FontSource::Font(&base), "Test/Bold", &InstanceOptions::default()).unwrap();
    let italic = InstanceOptions { italic: true, ..InstanceOptions::default() };
    project.generate_font(FontSource::Font(&base), "Test/Italic", &italic).unwrap();
    assert!(project.generate_ttfs().unwrap().all_succeeded());

    let style_bits = |file: &str| {
        let data = std::fs::read(dir.path().join("out/TestTTF").join(file)).unwrap();
        let font = FontRef::new(&data).unwrap();
        (font.os2().unwrap().fs_selection(), font.head().unwrap().mac_style())
    };
    assert_eq!(style_bits("Test-Bold.ttf"), (SelectionFlags::BOLD, MacStyle::BOLD));
    assert_eq!(
        style_bits("Test-Italic.ttf"),
        (SelectionFlags::ITALIC | SelectionFlags::OBLIQUE, MacStyle::ITALIC)
    );
}

fn build_two(compatible: bool) -> Vec<usize> {
    let dir = tempfile::tempdir().unwrap();
    let converter = RecordingConverter::default();
    let toolchain = Toolchain { converter: Box::new(converter.clone()), ..Toolchain::default() };
    let mut project = project(dir.path(), "", toolchain);
    project.compatible = compatible;
    let base = project.base_font().clone();

    for names in ["Test/Regular", "Test/Bold"] {
        project.generate_font(FontSource::Font(&base), names, &InstanceOptions::default()).unwrap();
    }
    let report = project.generate_ttfs().unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.succeeded.len(), 2);
    assert!(dir.path().join("out/TestTTF/Test-Bold.ttf").exists());
    assert!(project.queue().is_empty());

    converter.0.lock().unwrap().clone()
}

#[test]
fn test_compatible_batch_converts_jointly() {
    assert_eq!(build_two(true), [2]);
}

#[test]
fn test_batch_converts_each_font() {
    assert_eq!(build_two(false), [1, 1]);
}

#[test]
fn test_build_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    save_ufo(&base_font(), dir.path().join("Test-Regular.ufo")).unwrap();
    write(dir.path().join("glyphlist.txt"), "A;0041\nB;0042\n").unwrap();
    write(
        dir.path().join("project.toml"),
        r#"
[main]
foundry = "Test"
version = "1.002"

[glyphs]
delete = ["C"]

[res]
agl_glyphlistfile = "glyphlist.txt"

[[instance]]
name = "Test/Regular"

[[instance]]
name = "Test/Bold"
"#,
    )
    .unwrap();

    let report = build(&BuildOptions {
        config: dir.path().join("project.toml"),
        base: dir.path().join("Test-Regular.ufo"),
        build_dir: "out".into(),
        compatible: false,
        build_otf: false,
        skip_ttf: false,
    })
    .unwrap();

    assert_eq!(report.succeeded.len(), 2);
    assert!(dir.path().join("out/TestUFO/Test-Bold.ufo").exists());
    assert!(dir.path().join("out/TestTTF/Test-Regular.ttf").exists());
}

#[test]
fn test_otf_rejected_before_building() {
    let dir = tempfile::tempdir().unwrap();
    save_ufo(&base_font(), dir.path().join("Test-Regular.ufo")).unwrap();
    write(
        dir.path().join("project.toml"),
        "[main]\nfoundry = \"Test\"\nversion = \"1.000\"\n\n[[instance]]\nname = \"Test/Regular\"\n",
    )
    .unwrap();

    let err = build(&BuildOptions {
        config: dir.path().join("project.toml"),
        base: dir.path().join("Test-Regular.ufo"),
        build_dir: "out".into(),
        compatible: false,
        build_otf: true,
        skip_ttf: false,
    })
    .unwrap_err();

    assert!(err.to_string().contains("--otf"));
    assert!(!dir.path().join("out").exists());
}
