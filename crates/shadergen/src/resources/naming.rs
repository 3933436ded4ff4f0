//! Naming options for generated resource identifiers

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static CAPITALIZED_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z][^A-Z]*|[^A-Z]+").unwrap());
static REPEATED_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{2,}").unwrap());

/// Identifiers and affixes used when emitting resource declarations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceNaming {
    /// Descriptor-set macro guarding the shader resource block
    pub desc_set_name: String,
    /// Prefix of every shader image identifier
    pub prefix: String,
    pub sampler_postfix: String,
    /// Suffix of previous-frame instances
    pub history_postfix: String,
    pub debug_name_prefix: String,
    /// Define that, when set, hides attachment resources from shaders
    pub ignore_attachments_define: String,
    /// Macro standing for the invalid sampler binding
    pub invalid_binding_name: String,
}

impl Default for ResourceNaming {
    fn default() -> Self {
        Self {
            desc_set_name: "DESC_SET_FRAMEBUFFERS".to_string(),
            prefix: "framebuf".to_string(),
            sampler_postfix: "_Sampler".to_string(),
            history_postfix: "_Prev".to_string(),
            debug_name_prefix: "Framebuf ".to_string(),
            ignore_attachments_define: "FRAMEBUF_IGNORE_ATTACHMENTS".to_string(),
            invalid_binding_name: "FB_SAMPLER_INVALID_BINDING".to_string(),
        }
    }
}

impl ResourceNaming {
    /// Instance name of the previous-frame copy of `name`
    pub fn history_name(&self, name: &str) -> String {
        format!("{name}{}", self.history_postfix)
    }

    pub fn debug_name(&self, instance_name: &str) -> String {
        format!("{}{instance_name}", self.debug_name_prefix)
    }

    /// Shader identifier of the storage image for an instance
    pub fn image_identifier(&self, instance_name: &str) -> String {
        format!("{}{instance_name}", self.prefix)
    }

    /// Shader identifier of the sampler for an instance
    pub fn sampler_identifier(&self, instance_name: &str) -> String {
        format!("{}{instance_name}{}", self.prefix, self.sampler_postfix)
    }
}

/// Converts a PascalCase resource name into its enumerator suffix
///
/// The name is split before every capital letter, the pieces are joined with `_`
/// and upper-cased, and runs of underscores are collapsed.
///
/// # Examples
///
/// ```
/// use shadergen::resources::enum_name;
///
/// assert_eq!(enum_name("DISPingGradient"), "D_I_S_PING_GRADIENT");
/// assert_eq!(enum_name("Bloom_Mip1"), "BLOOM_MIP1");
/// ```
pub fn enum_name(name: &str) -> String {
    let words: Vec<&str> = CAPITALIZED_WORD.find_iter(name).map(|m| m.as_str()).collect();
    let joined = words.join("_").to_uppercase();
    REPEATED_UNDERSCORES.replace_all(&joined, "_").into_owned()
}
