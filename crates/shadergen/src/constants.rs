//! Preprocessor constants and their derivation rules
//!
//! Constants are listed in order. A derived constant is computed from constants
//! listed before it, so a single forward pass resolves the whole table.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named constant as written in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConstantDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub value: ConstantValue,
}

/// Value of a constant
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    /// Plain integer
    Value(i64),
    /// Single bit, emitted as `1 << i`
    Bit(u32),
    /// Expression copied verbatim, never usable in derivations
    Expr(String),
    Derive(Derivation),
}

/// Rule computing a constant from an earlier one
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    /// `(1 << value(name)) - 1`
    BitMask(String),
    /// `floor(log2(value(name)))`
    Log2(String),
}

/// Consistency check over already defined constants
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantGuard {
    /// The product of the named constants must not exceed `max`
    ProductAtMost { factors: Vec<String>, max: i64 },
}

/// A constant with its final textual value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConstant {
    pub name: String,
    /// Text placed inside the parentheses of the `#define`
    pub text: String,
    /// Integer value, if the constant has one
    pub integer: Option<i64>,
}

impl ResolvedConstant {
    /// Formats the constant as `#define NAME (value)`
    pub fn define(&self) -> String {
        format!("#define {} ({})", self.name, self.text)
    }
}

/// Resolved constant lists, in declaration order
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantTable {
    /// Constants emitted into every artifact
    pub common: Vec<ResolvedConstant>,
    /// Constants emitted only into the shader artifact
    pub shader_only: Vec<ResolvedConstant>,
}

/// Resolves both constant lists and checks every guard
///
/// Shader-only constants may reference common constants. Names must be unique
/// across both lists.
///
/// # Arguments
/// * `common` - Constants shared by host and shader artifacts
/// * `shader_only` - Constants only emitted for shaders
/// * `guards` - Checks evaluated once everything is resolved
///
/// # Returns
/// * `Result<ConstantTable>` - Resolved constants or the first failing rule
pub fn resolve_constants(common: &[ConstantDescriptor], shader_only: &[ConstantDescriptor], guards: &[ConstantGuard]) -> Result<ConstantTable> {
    let mut integers = HashMap::new();
    let mut table = ConstantTable {
        common: resolve_list(common, &mut integers)?,
        shader_only: Vec::new(),
    };
    table.shader_only = resolve_list(shader_only, &mut integers)?;

    for guard in guards {
        check_guard(guard, &integers)?;
    }

    tracing::debug!("Resolved {} common and {} shader-only constants", table.common.len(), table.shader_only.len());

    Ok(table)
}

fn resolve_list(list: &[ConstantDescriptor], integers: &mut HashMap<String, Option<i64>>) -> Result<Vec<ResolvedConstant>> {
    let mut resolved = Vec::with_capacity(list.len());

    for constant in list {
        if integers.contains_key(&constant.name) {
            return Err(Error::DescriptorInvariant {
                descriptor: constant.name.clone(),
                reason: "constant defined more than once".to_string(),
            });
        }

        let (text, integer) = match &constant.value {
            ConstantValue::Value(value) => (value.to_string(), Some(*value)),
            ConstantValue::Bit(bit) => {
                let value = 1i64.checked_shl(*bit).filter(|_| *bit < 63).ok_or_else(|| invariant(&constant.name, format!("bit {bit} is out of range")))?;
                (format!("1 << {bit}"), Some(value))
            }
            ConstantValue::Expr(expr) => (expr.clone(), None),
            ConstantValue::Derive(rule) => {
                let value = derive(&constant.name, rule, integers)?;
                tracing::debug!("Derived {} = {}", constant.name, value);
                (value.to_string(), Some(value))
            }
        };

        integers.insert(constant.name.clone(), integer);
        resolved.push(ResolvedConstant {
            name: constant.name.clone(),
            text,
            integer,
        });
    }

    Ok(resolved)
}

fn derive(name: &str, rule: &Derivation, integers: &HashMap<String, Option<i64>>) -> Result<i64> {
    match rule {
        Derivation::BitMask(bits) => {
            let count = lookup(name, bits, integers)?;
            if !(0..63).contains(&count) {
                return Err(invariant(name, format!("bit count {count} is out of range")));
            }
            Ok((1i64 << count) - 1)
        }
        Derivation::Log2(of) => {
            let value = lookup(name, of, integers)?;
            if value <= 0 {
                return Err(invariant(name, format!("log2 of non-positive value {value}")));
            }
            Ok(i64::from(value.ilog2()))
        }
    }
}

fn check_guard(guard: &ConstantGuard, integers: &HashMap<String, Option<i64>>) -> Result<()> {
    match guard {
        ConstantGuard::ProductAtMost { factors, max } => {
            let label = factors.join(" * ");
            let mut product = 1i64;
            for factor in factors {
                let value = lookup(&label, factor, integers)?;
                product = product.checked_mul(value).ok_or_else(|| invariant(&label, "product overflows".to_string()))?;
            }

            if product > *max {
                return Err(invariant(&label, format!("product {product} exceeds {max}")));
            }
            Ok(())
        }
    }
}

fn lookup(name: &str, reference: &str, integers: &HashMap<String, Option<i64>>) -> Result<i64> {
    integers.get(reference).copied().flatten().ok_or_else(|| Error::UnresolvedConstant {
        name: name.to_string(),
        missing: reference.to_string(),
    })
}

fn invariant(name: &str, reason: String) -> Error {
    Error::DescriptorInvariant {
        descriptor: name.to_string(),
        reason,
    }
}
