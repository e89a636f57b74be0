use crate::PersistError;
use anyhow::Result;
use itertools::Itertools;
use objgraph_types::serde::HomogeneityTag;
use objgraph_types::types::{TypeRef, TypeRegistry};


/// The homogeneity decision for one sequence, or for the values of one dictionary,
/// together with the shared type it chose, if any.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ElementTagging {
    AllNull,
    AllSameRuntimeType(TypeRef),
    AllDeclaredType(TypeRef),
    AllDifferentTypes,
    AllAreTypeValues,
}

impl ElementTagging {
    pub fn tag(&self) -> HomogeneityTag {
        match self {
            Self::AllNull => HomogeneityTag::AllNull,
            Self::AllSameRuntimeType(_) => HomogeneityTag::AllSameRuntimeType,
            Self::AllDeclaredType(_) => HomogeneityTag::AllDeclaredType,
            Self::AllDifferentTypes => HomogeneityTag::AllDifferentTypes,
            Self::AllAreTypeValues => HomogeneityTag::AllAreTypeValues,
        }
    }
}

/// Decides the tag of a non-empty sequence from its elements' runtime types, `None` being null.
pub fn tag_elements(
    runtimes: &[Option<TypeRef>],
    declared: &TypeRef,
    registry: &TypeRegistry,
) -> ElementTagging {
    if runtimes.iter().all(Option::is_none) {
        return ElementTagging::AllNull;
    }
    let Some(present) = all_present(runtimes) else {
        return ElementTagging::AllDifferentTypes;
    };
    if present.iter().all(|ty| **ty == TypeRef::TypeValue) {
        return ElementTagging::AllAreTypeValues;
    }
    shared_or_different(&present, declared, registry)
}

/// Like [`tag_elements`], for dictionary values. Only the shared-type tags and
/// [`ElementTagging::AllDifferentTypes`] apply, the latter also covering nulls.
pub fn tag_dictionary_values(
    runtimes: &[Option<TypeRef>],
    declared: &TypeRef,
    registry: &TypeRegistry,
) -> ElementTagging {
    match all_present(runtimes) {
        None => ElementTagging::AllDifferentTypes,
        Some(present) => shared_or_different(&present, declared, registry),
    }
}

/// Dictionary keys carry one type name for all of them, so they must all share one runtime type.
pub fn shared_key_type(keys: &[Option<TypeRef>], registry: &TypeRegistry) -> Result<TypeRef> {
    let describe = |key: &Option<TypeRef>| match key {
        None => String::from("null"),
        Some(ty) => registry.type_name(ty),
    };
    let first = match keys.first() {
        Some(Some(first)) => first,
        Some(None) | None => {
            let first = String::from("null");
            let other = keys.get(1).map_or_else(|| String::from("null"), describe);
            return Err(PersistError::MixedDictionaryKeys { first, other }.into());
        }
    };
    if let Some(other) = keys
        .iter()
        .find(|key| !matches!(key, Some(ty) if ty == first))
    {
        return Err(PersistError::MixedDictionaryKeys {
            first: registry.type_name(first),
            other: describe(other),
        }
        .into());
    }
    Ok(first.clone())
}

fn all_present(runtimes: &[Option<TypeRef>]) -> Option<Vec<&TypeRef>> {
    runtimes.iter().map(Option::as_ref).collect()
}

fn shared_or_different(
    present: &[&TypeRef],
    declared: &TypeRef,
    registry: &TypeRegistry,
) -> ElementTagging {
    if present.iter().all(|ty| *ty == declared) && !registry.needs_type_name(declared) {
        return ElementTagging::AllDeclaredType(declared.clone());
    }
    match present.first() {
        Some(first) if present.iter().all_equal() => {
            ElementTagging::AllSameRuntimeType((*first).clone())
        }
        _ => ElementTagging::AllDifferentTypes,
    }
}
