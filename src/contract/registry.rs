//! Abstract Contract Registry
//!
//! Holds every type definition together with the abstract operations each
//! type requires of its concrete subtypes, and verifies instance types
//! against those requirements at construction time.
//!
//! # Verification Walk
//! ```text
//! instance type ──parent──> ... ──parent──> declaring type ──> ... ──> ROOT
//!      │                                          │                   (not checked)
//!      └── resolve(name) <── requirement {name, min_arity}
//! ```
//!
//! Each requirement is resolved on the *instance* type, so the most-derived
//! override is the one checked. A requirement whose resolution is still the
//! abstract stub fails with `VirtualMethodError`; an override accepting
//! fewer arguments than required fails with `InsufficientArity`.

use alloc::string::String;
use alloc::vec::Vec;
use spin::RwLock;

use super::arity::Arity;
use super::error::ContractError;
use super::types::{
    AbstractRequirement, Method, MethodBody, NativeFn, TypeDef, TypeFlags, TypeRef,
};
use crate::object::Value;

/// Name of the common root type.
pub const ROOT_TYPE_NAME: &str = "Object";

/// Registry of types, methods and abstract contracts.
#[derive(Debug)]
pub struct TypeRegistry {
    types: RwLock<Vec<TypeDef>>,
}

impl TypeRegistry {
    /// Create a registry containing only the root type.
    pub fn new() -> Self {
        let mut types = Vec::new();
        types.push(TypeDef::new(ROOT_TYPE_NAME, None, TypeFlags::empty()));
        Self {
            types: RwLock::new(types),
        }
    }

    /// Get the root type.
    #[inline]
    pub const fn root(&self) -> TypeRef {
        TypeRef::ROOT
    }

    /// Define a new type under `parent`.
    ///
    /// The new type inherits the parent's flags in addition to `flags`.
    pub fn define_type(
        &self,
        name: &str,
        parent: TypeRef,
        flags: TypeFlags,
    ) -> Result<TypeRef, ContractError> {
        let mut types = self.types.write();
        let inherited = lookup(&types, parent)?.flags;

        let ty = TypeRef::from_index(types.len());
        types.push(TypeDef::new(name, Some(parent), inherited | flags));
        log::debug!("defined type {} ({:?}) under {:?}", name, ty, parent);
        Ok(ty)
    }

    /// Define (or override) a method on `ty`.
    pub fn define_method(
        &self,
        ty: TypeRef,
        name: &str,
        arity: Arity,
        body: NativeFn,
    ) -> Result<(), ContractError> {
        let mut types = self.types.write();
        let def = lookup_mut(&mut types, ty)?;
        def.methods.insert(
            String::from(name),
            Method {
                arity,
                body: MethodBody::Native(body),
            },
        );
        Ok(())
    }

    /// Get the name of a type.
    pub fn name(&self, ty: TypeRef) -> Result<String, ContractError> {
        Ok(lookup(&self.types.read(), ty)?.name.clone())
    }

    /// Get the parent of a type. The root has none.
    pub fn parent(&self, ty: TypeRef) -> Result<Option<TypeRef>, ContractError> {
        Ok(lookup(&self.types.read(), ty)?.parent)
    }

    /// Get the effective (inherited) flags of a type.
    pub fn flags(&self, ty: TypeRef) -> Result<TypeFlags, ContractError> {
        Ok(lookup(&self.types.read(), ty)?.flags)
    }

    /// Check whether `ty` is `ancestor` or descends from it.
    pub fn is_kind_of(&self, ty: TypeRef, ancestor: TypeRef) -> Result<bool, ContractError> {
        let types = self.types.read();
        let mut current = Some(ty);
        while let Some(cur) = current {
            if cur == ancestor {
                return Ok(true);
            }
            current = lookup(&types, cur)?.parent;
        }
        Ok(false)
    }

    /// Resolve `name` on `ty`, walking up the ancestry.
    pub fn resolve(&self, ty: TypeRef, name: &str) -> Result<Option<Method>, ContractError> {
        resolve_in(&self.types.read(), ty, name)
    }

    /// Requirements declared directly on `ty`.
    pub fn requirements(&self, ty: TypeRef) -> Result<Vec<AbstractRequirement>, ContractError> {
        Ok(lookup(&self.types.read(), ty)?.contract.iter().collect())
    }

    /// Declare abstract operations on `ty`.
    ///
    /// Installs a stub for each name. Calling a stub fails with
    /// `VirtualMethodError`, and constructing an instance of a type that
    /// leaves one in place is rejected.
    pub fn declare_abstract(&self, ty: TypeRef, names: &[&str]) -> Result<(), ContractError> {
        let mut types = self.types.write();
        let def = abstract_declaring(&mut types, ty)?;

        log::debug!("adding {} virtual operations to {}", names.len(), def.name);
        for name in names {
            install_stub(def, name, None);
        }
        Ok(())
    }

    /// Declare one abstract operation whose override must accept at least
    /// `min_arity` arguments.
    pub fn declare_abstract_with_arity(
        &self,
        ty: TypeRef,
        name: &str,
        min_arity: usize,
    ) -> Result<(), ContractError> {
        let mut types = self.types.write();
        let def = abstract_declaring(&mut types, ty)?;

        install_stub(def, name, Some(min_arity));
        log::debug!(
            "virtual operation `{}` required arity set to {} on {}",
            name,
            min_arity,
            def.name
        );
        Ok(())
    }

    /// Dynamic form of `declare_abstract_with_arity` taking a raw argument
    /// list `[name, arity]` as supplied by the scripting layer.
    pub fn declare_abstract_args(&self, ty: TypeRef, args: &[Value]) -> Result<(), ContractError> {
        let given = args.len();
        match args {
            [Value::Sym(name), Value::Int(min)] if *min >= 0 => {
                let min_arity =
                    usize::try_from(*min).map_err(|_| ContractError::ArityMismatchArgs { given })?;
                self.declare_abstract_with_arity(ty, name, min_arity)
            }
            _ => Err(ContractError::ArityMismatchArgs { given }),
        }
    }

    /// Verify that `instance_ty` satisfies every abstract requirement of its
    /// ancestry, up to but excluding the root.
    pub fn verify(&self, instance_ty: TypeRef) -> Result<(), ContractError> {
        let types = self.types.read();
        let instance_name = &lookup(&types, instance_ty)?.name;
        log::debug!("checking virtual operations for {}", instance_name);

        let mut current = instance_ty;
        while current != TypeRef::ROOT {
            let def = lookup(&types, current)?;

            if def.contract.is_empty() {
                log::trace!("  skipping {}: no virtual operations", def.name);
            } else {
                for requirement in def.contract.iter() {
                    check_requirement(&types, instance_ty, &requirement)?;
                }
            }

            match def.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup(types: &[TypeDef], ty: TypeRef) -> Result<&TypeDef, ContractError> {
    types.get(ty.index()).ok_or(ContractError::UnknownType(ty))
}

fn lookup_mut(types: &mut [TypeDef], ty: TypeRef) -> Result<&mut TypeDef, ContractError> {
    types
        .get_mut(ty.index())
        .ok_or(ContractError::UnknownType(ty))
}

/// Fetch `ty` for declaration, refusing concrete types.
fn abstract_declaring(types: &mut [TypeDef], ty: TypeRef) -> Result<&mut TypeDef, ContractError> {
    let def = lookup_mut(types, ty)?;
    if !def.flags.contains(TypeFlags::ABSTRACT_DECLARING) {
        log::warn!("refusing abstract declaration on concrete type {}", def.name);
        return Err(ContractError::NotAbstractDeclaring {
            type_name: def.name.clone(),
        });
    }
    Ok(def)
}

fn install_stub(def: &mut TypeDef, name: &str, min_arity: Option<usize>) {
    log::trace!("  adding abstract operation `{}` to {}", name, def.name);
    def.methods.insert(String::from(name), Method::stub());
    def.contract.insert(name, min_arity);
}

fn resolve_in(types: &[TypeDef], ty: TypeRef, name: &str) -> Result<Option<Method>, ContractError> {
    let mut current = Some(ty);
    while let Some(cur) = current {
        let def = lookup(types, cur)?;
        if let Some(method) = def.methods.get(name) {
            return Ok(Some(*method));
        }
        current = def.parent;
    }
    Ok(None)
}

fn check_requirement(
    types: &[TypeDef],
    instance_ty: TypeRef,
    requirement: &AbstractRequirement,
) -> Result<(), ContractError> {
    let name = &requirement.name;
    let method = match resolve_in(types, instance_ty, name)? {
        Some(method) if !method.is_abstract() => method,
        _ => {
            log::debug!("  `{}` was never overridden", name);
            return Err(ContractError::VirtualMethodError { name: name.clone() });
        }
    };

    let Some(required) = requirement.min_arity else {
        return Ok(());
    };

    let actual = method.arity.required();
    log::trace!(
        "  `{}`: required arity {}, actual arity {} (raw {})",
        name,
        required,
        actual,
        method.arity.raw()
    );

    if required > actual {
        return Err(ContractError::InsufficientArity {
            name: name.clone(),
            required,
            actual,
        });
    }

    Ok(())
}
