//! Host (C/C++) artifacts

use super::{CompiledManifest, HOST_RESOURCE_HEADER, push_banner, push_defines, push_structs};
use crate::resources::{ResourceFlag, ResourceFlags, SamplerBinding};

const TAB: &str = "    ";

/// Renders `ShaderCommonC.h`: constants and host struct declarations
pub fn host_common_header(compiled: &CompiledManifest) -> String {
    let mut output = String::new();
    push_banner(&mut output, &compiled.options);
    output.push_str("#pragma once\n\n");
    output.push_str(&format!("namespace {}\n{{\n\n", compiled.options.namespace));
    output.push_str("#include <stdint.h>\n\n");
    push_defines(&mut output, &compiled.constants.common);
    push_structs(&mut output, &compiled.host_structs);
    output.push_str("}\n");
    output
}

/// Renders `ShaderCommonCFramebuf.h`: resource enumerations and table declarations
pub fn host_resource_header(compiled: &CompiledManifest) -> String {
    let naming = &compiled.naming;
    let table = &compiled.table;

    let mut output = String::new();
    push_banner(&mut output, &compiled.options);
    output.push_str("#pragma once\n\n");
    for include in &compiled.options.host_includes {
        output.push_str(&format!("#include \"{include}\"\n"));
    }
    output.push('\n');
    output.push_str(&format!("namespace {}\n{{\n\n", compiled.options.namespace));

    output.push_str(&format!("#define {} 0xFFFFFFFF\n\n", naming.invalid_binding_name));

    output.push_str("enum FramebufferImageIndex\n{\n");
    for (index, instance) in table.instances.iter().enumerate() {
        output.push_str(&format!("{TAB}FB_IMAGE_INDEX_{} = {index},\n", instance.enum_name));
    }
    output.push_str("};\n\n");

    output.push_str("enum FramebufferImageFlagBits\n{\n");
    for flag in ResourceFlag::ALL.into_iter().filter(|flag| flag.is_public()) {
        output.push_str(&format!("{TAB}FB_IMAGE_FLAGS_{} = {},\n", flag.enum_name(), flag.bit()));
    }
    output.push_str("};\ntypedef uint32_t FramebufferImageFlags;\n\n");

    output.push_str(&format!("constexpr uint32_t ShFramebuffers_Count = {};\n", table.len()));
    output.push_str("extern const VkFormat ShFramebuffers_Formats[];\n");
    output.push_str("extern const FramebufferImageFlags ShFramebuffers_Flags[];\n");
    output.push_str("extern const uint32_t ShFramebuffers_Bindings[];\n");
    output.push_str("extern const uint32_t ShFramebuffers_BindingsSwapped[];\n");
    output.push_str("extern const uint32_t ShFramebuffers_Sampler_Bindings[];\n");
    output.push_str("extern const uint32_t ShFramebuffers_Sampler_BindingsSwapped[];\n");
    output.push_str("extern const char *const ShFramebuffers_DebugNames[];\n");
    output.push_str("extern const wchar_t *const ShFramebuffers_DebugNamesW[];\n\n");

    output.push_str("}\n");
    output
}

/// Renders `ShaderCommonCFramebuf.cpp`: the eight positionally aligned tables
pub fn host_resource_source(compiled: &CompiledManifest) -> String {
    let ns = &compiled.options.namespace;
    let table = &compiled.table;
    let names: Vec<&str> = table.instances.iter().map(|instance| instance.name.as_str()).collect();

    let mut output = String::new();
    push_banner(&mut output, &compiled.options);
    output.push_str(&format!("#include \"{HOST_RESOURCE_HEADER}\"\n\n"));

    let formats = table.formats.iter().zip(&names).map(|(format, name)| format!("{format}, // {name}"));
    push_array(&mut output, &format!("const VkFormat {ns}::ShFramebuffers_Formats[]"), formats);

    let flags = table.flags.iter().zip(&names).map(|(flags, name)| format!("{}, // {name}", flag_expression(ns, *flags)));
    push_array(&mut output, &format!("const {ns}::FramebufferImageFlags {ns}::ShFramebuffers_Flags[]"), flags);

    push_array(&mut output, &format!("const uint32_t {ns}::ShFramebuffers_Bindings[]"), table.bindings.iter().map(|b| format!("{b},")));
    push_array(&mut output, &format!("const uint32_t {ns}::ShFramebuffers_BindingsSwapped[]"), table.bindings_swapped.iter().map(|b| format!("{b},")));

    let sampler = |binding: &SamplerBinding| match binding {
        SamplerBinding::Bound(value) => format!("{value},"),
        SamplerBinding::Invalid => format!("{},", compiled.naming.invalid_binding_name),
    };
    push_array(&mut output, &format!("const uint32_t {ns}::ShFramebuffers_Sampler_Bindings[]"), table.sampler_bindings.iter().map(sampler));
    push_array(&mut output, &format!("const uint32_t {ns}::ShFramebuffers_Sampler_BindingsSwapped[]"), table.sampler_bindings_swapped.iter().map(sampler));

    push_array(&mut output, &format!("const char *const {ns}::ShFramebuffers_DebugNames[]"), table.debug_names.iter().map(|name| format!("\"{name}\",")));
    push_array(&mut output, &format!("const wchar_t *const {ns}::ShFramebuffers_DebugNamesW[]"), table.debug_names.iter().map(|name| format!("L\"{name}\",")));

    output
}

fn push_array(output: &mut String, declaration: &str, entries: impl Iterator<Item = String>) {
    output.push_str(&format!("{declaration} =\n{{\n"));
    for entry in entries {
        output.push_str(&format!("{TAB}{entry}\n"));
    }
    output.push_str("};\n\n");
}

/// `0` or the public flag enumerators joined with `|`
fn flag_expression(ns: &str, flags: ResourceFlags) -> String {
    if flags.is_empty() {
        return "0".to_string();
    }
    flags.iter().map(|flag| format!("{ns}::FB_IMAGE_FLAGS_{}", flag.enum_name())).collect::<Vec<_>>().join(" | ")
}
