//! Shader (GLSL) artifact

use super::{CompiledManifest, push_banner, push_defines, push_structs};
use crate::resources::SamplerBinding;
use crate::types::ScalarType;
use crate::types::image_formats::{shader_image_type, shader_sampler_type};

/// Renders `ShaderCommonGLSL.h`
///
/// Constants, shader-only constants and shader structs come first, followed by the
/// resource block guarded by the descriptor-set macro.
pub fn shader_common_header(compiled: &CompiledManifest) -> String {
    let mut output = String::new();
    push_banner(&mut output, &compiled.options);
    push_defines(&mut output, &compiled.constants.common);
    push_defines(&mut output, &compiled.constants.shader_only);
    push_structs(&mut output, &compiled.shader_structs);
    push_resource_block(&mut output, compiled);
    output
}

fn push_resource_block(output: &mut String, compiled: &CompiledManifest) {
    let naming = &compiled.naming;
    let table = &compiled.table;

    output.push_str(&format!("#ifdef {}\n\n", naming.desc_set_name));

    output.push_str("// framebuffer indices\n");
    for (index, instance) in table.instances.iter().enumerate() {
        output.push_str(&format!("#define FB_IMAGE_INDEX_{} {index}\n", instance.enum_name));
    }

    output.push_str("\n// framebuffers\n");
    let images: Vec<String> = (0..table.len()).map(|index| image_declaration(compiled, index)).collect();
    push_grouped(output, compiled, &images);

    output.push_str("\n// samplers\n");
    let samplers: Vec<String> = (0..table.len()).map(|index| sampler_declaration(compiled, index)).collect();
    push_grouped(output, compiled, &samplers);

    output.push_str("\n// pack/unpack formats\n");
    for resource in compiled.resources.iter().filter(|r| r.pixel_type == ScalarType::PackE5 && r.has_sampler()) {
        let guarded = resource.is_attachment();
        if guarded {
            output.push_str(&format!("#ifndef {}\n", naming.ignore_attachments_define));
        }

        let image = naming.image_identifier(&resource.name);
        let sampler = naming.sampler_identifier(&resource.name);
        output.push_str(&format!("void imageStore{}(const ivec2 pix, const vec3 unpacked) {{ imageStore({image}, pix, uvec4(encodeE5B9G9R9(unpacked))); }}\n", resource.name));
        output.push_str(&format!("vec3 texelFetch{}(const ivec2 pix) {{ return decodeE5B9G9R9(texelFetch({sampler}, pix, 0).r); }}\n", resource.name));
        if resource.has_history() {
            let history = naming.history_name(&resource.name);
            let history_sampler = naming.sampler_identifier(&history);
            output.push_str(&format!("vec3 texelFetch{history}(const ivec2 pix) {{ return decodeE5B9G9R9(texelFetch({history_sampler}, pix, 0).r); }}\n"));
        }

        if guarded {
            output.push_str("#endif\n");
        }
    }

    output.push_str("\n#endif\n");
}

/// Storage image declaration of one instance
fn image_declaration(compiled: &CompiledManifest, index: usize) -> String {
    let instance = &compiled.table.instances[index];
    let resource = &compiled.resources[instance.descriptor];

    format!(
        "layout(set = {}, binding = {}, {}) uniform {} {};",
        compiled.naming.desc_set_name,
        compiled.table.bindings[index],
        compiled.table.shader_formats[index],
        shader_image_type(resource.pixel_type),
        compiled.naming.image_identifier(&instance.name),
    )
}

/// Sampler declaration of one instance, empty for resources without a sampler
fn sampler_declaration(compiled: &CompiledManifest, index: usize) -> String {
    let instance = &compiled.table.instances[index];
    let resource = &compiled.resources[instance.descriptor];

    match compiled.table.sampler_bindings[index] {
        SamplerBinding::Bound(binding) => format!(
            "layout(set = {}, binding = {binding}) uniform {} {};",
            compiled.naming.desc_set_name,
            shader_sampler_type(resource.pixel_type),
            compiled.naming.sampler_identifier(&instance.name),
        ),
        SamplerBinding::Invalid => String::new(),
    }
}

/// Writes per-instance lines, wrapping each attachment resource's lines in the ignore guard
fn push_grouped(output: &mut String, compiled: &CompiledManifest, lines: &[String]) {
    let define = &compiled.naming.ignore_attachments_define;
    let mut open_guard: Option<usize> = None;

    for (index, line) in lines.iter().enumerate() {
        let descriptor = compiled.table.instances[index].descriptor;
        if open_guard.is_some_and(|open| open != descriptor) {
            output.push_str("#endif\n");
            open_guard = None;
        }
        if line.is_empty() {
            continue;
        }
        if open_guard.is_none() && compiled.is_attachment(index) {
            output.push_str(&format!("#ifndef {define}\n"));
            open_guard = Some(descriptor);
        }
        output.push_str(line);
        output.push('\n');
    }

    if open_guard.is_some() {
        output.push_str("#endif\n");
    }
}
