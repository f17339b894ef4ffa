//! WGSL validation for the render shader.

use tunnelfx::shader::SHADER_SOURCE;

#[test]
fn render_shader_parses_and_validates() {
    let module = naga::front::wgsl::parse_str(SHADER_SOURCE)
        .unwrap_or_else(|e| panic!("WGSL parse error: {e:?}"));

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .unwrap_or_else(|e| panic!("WGSL validation error: {e:?}"));
}

#[test]
fn render_shader_has_both_entry_points() {
    let module = naga::front::wgsl::parse_str(SHADER_SOURCE).expect("shader should parse");
    let names: Vec<_> = module.entry_points.iter().map(|ep| ep.name.as_str()).collect();
    assert!(names.contains(&"vs_main"));
    assert!(names.contains(&"fs_main"));
}
