//! Binding allocation over the ordered resource list
//!
//! A single pass over the resources yields every positionally aligned table the
//! host and shader artifacts need. Index `i` of each table describes the same
//! image instance, and instance order is the enumeration order.

use super::{ImageResourceDescriptor, ResourceFlags, ResourceNaming, enum_name};
use crate::error::{Error, Result};
use crate::types::image_formats::{host_image_format, shader_image_format};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Numeric value of the invalid sampler binding
pub const INVALID_BINDING: u32 = 0xFFFF_FFFF;

/// Sampler binding of a single image instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SamplerBinding {
    Bound(u32),
    /// The resource has no sampler
    Invalid,
}

impl SamplerBinding {
    pub fn value(self) -> u32 {
        match self {
            Self::Bound(binding) => binding,
            Self::Invalid => INVALID_BINDING,
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

impl fmt::Display for SamplerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound(binding) => write!(f, "{binding}"),
            Self::Invalid => write!(f, "{INVALID_BINDING:#X}"),
        }
    }
}

/// One allocated image, either a resource or its previous-frame copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceInstance {
    /// Index into the descriptor list
    pub descriptor: usize,
    /// Instance name, with the history postfix for previous-frame copies
    pub name: String,
    /// Enumerator suffix derived from `name`
    pub enum_name: String,
    pub is_history: bool,
}

/// All per-instance tables produced by [`allocate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceTable {
    pub instances: Vec<ResourceInstance>,
    /// Host `VkFormat` identifiers
    pub formats: Vec<&'static str>,
    /// GLSL image format qualifiers
    pub shader_formats: Vec<&'static str>,
    /// Public flags of the owning resource
    pub flags: Vec<ResourceFlags>,
    pub bindings: Vec<u32>,
    pub bindings_swapped: Vec<u32>,
    pub sampler_bindings: Vec<SamplerBinding>,
    pub sampler_bindings_swapped: Vec<SamplerBinding>,
    pub debug_names: Vec<String>,
}

impl ResourceTable {
    /// Number of image instances, which is also the number of image bindings
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Allocates image and sampler bindings for `resources` in order
///
/// The image pass gives every resource one binding, or two consecutive bindings
/// when it keeps a previous-frame copy. The sampler pass continues counting from
/// where the image pass stopped and mirrors that layout; resources without a
/// sampler receive [`SamplerBinding::Invalid`] and do not consume a binding.
///
/// # Arguments
/// * `resources` - Resource descriptors in allocation order
/// * `naming` - Affixes used for instance and debug names
///
/// # Returns
/// * `Result<ResourceTable>` - Aligned tables, or the first descriptor or format error
pub fn allocate(resources: &[ImageResourceDescriptor], naming: &ResourceNaming) -> Result<ResourceTable> {
    validate(resources)?;

    let capacity = resources.iter().map(ImageResourceDescriptor::instance_count).sum();
    let mut table = ResourceTable {
        instances: Vec::with_capacity(capacity),
        formats: Vec::with_capacity(capacity),
        shader_formats: Vec::with_capacity(capacity),
        flags: Vec::with_capacity(capacity),
        bindings: Vec::with_capacity(capacity),
        bindings_swapped: Vec::with_capacity(capacity),
        sampler_bindings: Vec::with_capacity(capacity),
        sampler_bindings_swapped: Vec::with_capacity(capacity),
        debug_names: Vec::with_capacity(capacity),
    };

    let mut image_binding = 0u32;
    for (index, resource) in resources.iter().enumerate() {
        let format = host_image_format(resource.pixel_type, resource.channels)?;
        let shader_format = shader_image_format(resource.pixel_type, resource.channels)?;
        let flags = resource.flags.public();

        let mut names = vec![(resource.name.clone(), false)];
        if resource.has_history() {
            names.push((naming.history_name(&resource.name), true));
        }

        for (name, is_history) in names {
            table.formats.push(format);
            table.shader_formats.push(shader_format);
            table.flags.push(flags);
            table.debug_names.push(naming.debug_name(&name));
            table.instances.push(ResourceInstance {
                descriptor: index,
                enum_name: enum_name(&name),
                name,
                is_history,
            });
        }

        if resource.has_history() {
            table.bindings.extend([image_binding, image_binding + 1]);
            table.bindings_swapped.extend([image_binding + 1, image_binding]);
            image_binding += 2;
        } else {
            table.bindings.push(image_binding);
            table.bindings_swapped.push(image_binding);
            image_binding += 1;
        }
    }

    let mut sampler_binding = image_binding;
    for resource in resources {
        let slots = resource.instance_count();
        if !resource.has_sampler() {
            table.sampler_bindings.extend(std::iter::repeat_n(SamplerBinding::Invalid, slots));
            table.sampler_bindings_swapped.extend(std::iter::repeat_n(SamplerBinding::Invalid, slots));
            continue;
        }

        if resource.has_history() {
            let (current, previous) = (SamplerBinding::Bound(sampler_binding), SamplerBinding::Bound(sampler_binding + 1));
            table.sampler_bindings.extend([current, previous]);
            table.sampler_bindings_swapped.extend([previous, current]);
            sampler_binding += 2;
        } else {
            table.sampler_bindings.push(SamplerBinding::Bound(sampler_binding));
            table.sampler_bindings_swapped.push(SamplerBinding::Bound(sampler_binding));
            sampler_binding += 1;
        }
    }

    tracing::debug!("Allocated {} image instances, {} image bindings, {} sampler bindings", table.len(), image_binding, sampler_binding - image_binding);

    Ok(table)
}

fn validate(resources: &[ImageResourceDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for resource in resources {
        if resource.name.is_empty() {
            return Err(Error::DescriptorInvariant {
                descriptor: "<unnamed resource>".to_string(),
                reason: "resource name must not be empty".to_string(),
            });
        }

        if !seen.insert(resource.name.as_str()) {
            return Err(Error::DescriptorInvariant {
                descriptor: resource.name.clone(),
                reason: "duplicate resource name".to_string(),
            });
        }

        // Both vocabularies are checked before anything is allocated
        host_image_format(resource.pixel_type, resource.channels)?;
        shader_image_format(resource.pixel_type, resource.channels)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceFlag;
    use crate::types::{ScalarType, image_formats::ChannelLayout};

    fn resource(name: &str, flags: &[ResourceFlag]) -> ImageResourceDescriptor {
        ImageResourceDescriptor::new(name, ScalarType::Float16, ChannelLayout::Rgba, flags)
    }

    fn assert_table_invariants(table: &ResourceTable) {
        let len = table.len();
        assert_eq!(table.formats.len(), len);
        assert_eq!(table.shader_formats.len(), len);
        assert_eq!(table.flags.len(), len);
        assert_eq!(table.bindings.len(), len);
        assert_eq!(table.bindings_swapped.len(), len);
        assert_eq!(table.sampler_bindings.len(), len);
        assert_eq!(table.sampler_bindings_swapped.len(), len);
        assert_eq!(table.debug_names.len(), len);

        for i in 0..len {
            assert_eq!(table.bindings[i], i as u32);
            let partner = table.bindings_swapped[i] as usize;
            assert_eq!(table.bindings_swapped[partner], i as u32, "swapped bindings must be an involution");
            assert_eq!(table.sampler_bindings[i].is_valid(), table.sampler_bindings_swapped[i].is_valid());
        }
    }

    #[test]
    fn test_allocate_with_history() {
        let resources = [resource("A", &[]), resource("B", &[ResourceFlag::StorePrev])];
        let table = allocate(&resources, &ResourceNaming::default()).unwrap();

        assert_table_invariants(&table);
        assert_eq!(table.bindings, [0, 1, 2]);
        assert_eq!(table.bindings_swapped, [0, 2, 1]);
        assert_eq!(table.sampler_bindings, [SamplerBinding::Bound(3), SamplerBinding::Bound(4), SamplerBinding::Bound(5)]);
        assert_eq!(table.sampler_bindings_swapped, [SamplerBinding::Bound(3), SamplerBinding::Bound(5), SamplerBinding::Bound(4)]);

        let names: Vec<_> = table.instances.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "B_Prev"]);
        assert_eq!(table.instances[2].enum_name, "B_PREV");
        assert!(table.instances[2].is_history);
        assert_eq!(table.instances[2].descriptor, 1);
        assert_eq!(table.debug_names[2], "Framebuf B_Prev");
        assert_eq!(table.formats, ["VK_FORMAT_R16G16B16A16_SFLOAT"; 3]);
        assert_eq!(table.shader_formats, ["rgba16f"; 3]);
    }

    #[test]
    fn test_no_sampler_does_not_consume_binding() {
        let resources = [
            resource("Hidden", &[ResourceFlag::NoSampler, ResourceFlag::StorePrev]),
            resource("Visible", &[]),
        ];
        let table = allocate(&resources, &ResourceNaming::default()).unwrap();

        assert_table_invariants(&table);
        assert_eq!(table.sampler_bindings[..2], [SamplerBinding::Invalid; 2]);
        assert_eq!(table.sampler_bindings_swapped[..2], [SamplerBinding::Invalid; 2]);
        assert_eq!(table.sampler_bindings[2], SamplerBinding::Bound(3));
        assert_eq!(SamplerBinding::Invalid.value(), 0xFFFFFFFF);
    }

    #[test]
    fn test_private_flags_hidden_from_table() {
        let resources = [resource("Img", &[ResourceFlag::StorePrev, ResourceFlag::IsAttachment])];
        let table = allocate(&resources, &ResourceNaming::default()).unwrap();

        for flags in &table.flags {
            assert!(flags.contains(ResourceFlag::IsAttachment));
            assert!(!flags.contains(ResourceFlag::StorePrev));
        }
    }

    #[test]
    fn test_instance_count() {
        let resources = [
            resource("One", &[ResourceFlag::StorePrev]),
            resource("Two", &[]),
            resource("Three", &[ResourceFlag::StorePrev, ResourceFlag::NoSampler]),
            resource("Four", &[ResourceFlag::UpscaledSize]),
        ];
        let table = allocate(&resources, &ResourceNaming::default()).unwrap();

        assert_eq!(table.len(), 6);
        assert_table_invariants(&table);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let resources = [resource("Same", &[]), resource("Same", &[ResourceFlag::StorePrev])];
        let err = allocate(&resources, &ResourceNaming::default()).unwrap_err();
        assert!(matches!(err, Error::DescriptorInvariant { .. }));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let resources = [ImageResourceDescriptor::new("Odd", ScalarType::Pack11, ChannelLayout::R, &[])];
        let err = allocate(&resources, &ResourceNaming::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownType(_)));
    }

    #[test]
    fn test_empty_resource_list() {
        let table = allocate(&[], &ResourceNaming::default()).unwrap();
        assert!(table.is_empty());
    }
}
