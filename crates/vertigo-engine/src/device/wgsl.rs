//! WGSL front end shared by the backends.
//!
//! `compile` parses and validates one stage with naga and checks that the
//! requested entry point exists for that stage. `link` checks the interface
//! between two compiled stages and the program layout: every fragment input
//! must be produced by the vertex stage with the same type, every vertex input
//! must be fed by a declared attribute, and the uniform block must fit the
//! declared size. The diagnostics are what a GL driver would put in its
//! compile/link info log.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::types::{ProgramLayout, ShaderStage};

/// A stage that parsed and validated.
#[derive(Debug)]
pub(crate) struct CompiledStage {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub source: String,
    module: naga::Module,
}

pub(crate) fn compile(
    stage: ShaderStage,
    source: &str,
    entry_point: &str,
) -> Result<CompiledStage, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let Some(ep) = module.entry_points.iter().find(|ep| ep.name == entry_point) else {
        return Err(format!("entry point `{entry_point}` not found in {stage} shader"));
    };
    if ep.stage != stage.to_naga() {
        return Err(format!(
            "entry point `{entry_point}` is a {:?} entry point, expected {stage}",
            ep.stage
        ));
    }

    Ok(CompiledStage {
        stage,
        entry_point: entry_point.to_string(),
        source: source.to_string(),
        module,
    })
}

pub(crate) fn link(
    vertex: &CompiledStage,
    fragment: &CompiledStage,
    layout: &ProgramLayout,
) -> Result<(), String> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(format!(
            "expected a vertex and a fragment stage, got {} and {}",
            vertex.stage, fragment.stage
        ));
    }

    let mut errors = Vec::new();

    let vs_inputs = entry_inputs(vertex);
    let vs_outputs = entry_outputs(vertex);
    let fs_inputs = entry_inputs(fragment);

    for (location, inner) in &vs_inputs {
        match layout.attributes.get(*location as usize) {
            None => errors.push(format!(
                "vertex input @location({location}) has no declared attribute"
            )),
            Some(attr) if !is_float(inner) => errors.push(format!(
                "attribute `{}` (@location({location})) must be a float scalar or vector in the shader",
                attr.name
            )),
            Some(_) => {}
        }
    }

    for (location, inner) in &fs_inputs {
        match vs_outputs.iter().find(|(l, _)| l == location) {
            None => errors.push(format!(
                "fragment input @location({location}) is not written by the vertex stage"
            )),
            Some((_, out)) if out != inner => errors.push(format!(
                "fragment input @location({location}) type does not match the vertex output"
            )),
            Some(_) => {}
        }
    }

    for stage in [vertex, fragment] {
        check_globals(stage, layout, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}

fn entry_point(stage: &CompiledStage) -> Option<&naga::EntryPoint> {
    stage
        .module
        .entry_points
        .iter()
        .find(|ep| ep.name == stage.entry_point)
}

fn entry_inputs(stage: &CompiledStage) -> Vec<(u32, naga::TypeInner)> {
    let mut out = Vec::new();
    if let Some(ep) = entry_point(stage) {
        for arg in &ep.function.arguments {
            collect_locations(&stage.module, arg.ty, arg.binding.as_ref(), &mut out);
        }
    }
    out
}

fn entry_outputs(stage: &CompiledStage) -> Vec<(u32, naga::TypeInner)> {
    let mut out = Vec::new();
    if let Some(result) = entry_point(stage).and_then(|ep| ep.function.result.as_ref()) {
        collect_locations(&stage.module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

/// Flattens user-defined IO (`@location`) of an argument or result, descending into structs.
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<(u32, naga::TypeInner)>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.push((*location, module.types[ty].inner.clone()));
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn is_float(inner: &naga::TypeInner) -> bool {
    match inner {
        naga::TypeInner::Scalar(scalar) | naga::TypeInner::Vector { scalar, .. } => {
            scalar.kind == naga::ScalarKind::Float
        }
        _ => false,
    }
}

fn check_globals(stage: &CompiledStage, layout: &ProgramLayout, errors: &mut Vec<String>) {
    let module = &stage.module;
    for (_, var) in module.global_variables.iter() {
        let name = var.name.as_deref().unwrap_or("<unnamed>");

        if matches!(
            var.space,
            naga::AddressSpace::Handle | naga::AddressSpace::Storage { .. }
        ) {
            errors.push(format!(
                "{} shader: resource `{name}` is not supported; only one uniform block is",
                stage.stage
            ));
            continue;
        }
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }

        match &var.binding {
            Some(b) if b.group == 0 && b.binding == 0 => {}
            _ => errors.push(format!(
                "{} shader: uniform block `{name}` must be bound at @group(0) @binding(0)",
                stage.stage
            )),
        }

        let required = module.types[var.ty].inner.size(module.to_ctx()) as u64;
        if layout.uniform_size < required {
            errors.push(format!(
                "{} shader: uniform block `{name}` needs {required} bytes, layout declares {}",
                stage.stage, layout.uniform_size
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{VertexAttribute, VertexFormat};

    const VS: &str = r#"
struct Uniforms {
    mvp: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> u: Uniforms;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.position = u.mvp * vec4<f32>(pos, 1.0);
    out.color = color;
    return out;
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

    fn layout(uniform_size: u64) -> ProgramLayout {
        ProgramLayout {
            attributes: vec![
                VertexAttribute { name: "pos".into(), format: VertexFormat::Float32x3 },
                VertexAttribute { name: "color".into(), format: VertexFormat::Float32x4 },
            ],
            uniform_size,
            depth_test: true,
        }
    }

    #[test]
    fn compiles_valid_stages() {
        assert!(compile(ShaderStage::Vertex, VS, "vs_main").is_ok());
        assert!(compile(ShaderStage::Fragment, FS, "fs_main").is_ok());
    }

    #[test]
    fn syntax_error_reports_log() {
        let err = compile(ShaderStage::Vertex, "fn broken( {", "vs_main").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn missing_entry_point_is_a_compile_error() {
        let err = compile(ShaderStage::Vertex, VS, "main").unwrap_err();
        assert!(err.contains("`main`"), "{err}");
    }

    #[test]
    fn entry_point_of_wrong_stage_is_rejected() {
        let err = compile(ShaderStage::Vertex, FS, "fs_main").unwrap_err();
        assert!(err.contains("expected vertex"), "{err}");
    }

    #[test]
    fn links_matching_interface() {
        let vs = compile(ShaderStage::Vertex, VS, "vs_main").unwrap();
        let fs = compile(ShaderStage::Fragment, FS, "fs_main").unwrap();
        assert_eq!(link(&vs, &fs, &layout(64)), Ok(()));
    }

    #[test]
    fn fragment_input_without_vertex_output_fails_link() {
        let fs_src = r#"
@fragment
fn fs_main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint;
}
"#;
        let vs = compile(ShaderStage::Vertex, VS, "vs_main").unwrap();
        let fs = compile(ShaderStage::Fragment, fs_src, "fs_main").unwrap();
        let err = link(&vs, &fs, &layout(64)).unwrap_err();
        assert!(err.contains("@location(3)"), "{err}");
    }

    #[test]
    fn undeclared_attribute_fails_link() {
        let vs = compile(ShaderStage::Vertex, VS, "vs_main").unwrap();
        let fs = compile(ShaderStage::Fragment, FS, "fs_main").unwrap();
        let mut short = layout(64);
        short.attributes.truncate(1);
        let err = link(&vs, &fs, &short).unwrap_err();
        assert!(err.contains("@location(1)"), "{err}");
    }

    #[test]
    fn undersized_uniform_block_fails_link() {
        let vs = compile(ShaderStage::Vertex, VS, "vs_main").unwrap();
        let fs = compile(ShaderStage::Fragment, FS, "fs_main").unwrap();
        let err = link(&vs, &fs, &layout(16)).unwrap_err();
        assert!(err.contains("needs 64 bytes"), "{err}");
    }
}
