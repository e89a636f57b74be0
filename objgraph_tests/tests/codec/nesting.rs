use super::helpers::check::persist_err;
use super::helpers::fixture::NEST_LEVELS;
use anyhow::Result;
use objgraph_engine::{ObjectCodec, PersistError, MAX_NESTING_DEPTH};
use objgraph_types::types::{Fields, TypeRef, Value};

fn level_ty(level: usize) -> TypeRef {
    TypeRef::named(format!("Nest.W{level}"))
}

/// `Nest.W{from}` holding every deeper level.
fn chain(from: usize) -> Value {
    let mut value = Value::object(
        level_ty(NEST_LEVELS),
        Fields::new().with("value", 42i32),
    );
    for level in (from..NEST_LEVELS).rev() {
        value = Value::object(level_ty(level), Fields::new().with("inner", value));
    }
    value
}

pub fn test_nesting_guard(codec: &ObjectCodec) -> Result<()> {
    assert_eq!(MAX_NESTING_DEPTH + 1, NEST_LEVELS);

    // As deep as allowed: one presence byte per outer level, then the innermost Int32.
    let from = NEST_LEVELS - MAX_NESTING_DEPTH + 1;
    let shallow = chain(from);
    let buf = codec.save_to_vec(&shallow, &level_ty(from))?;
    assert_eq!(MAX_NESTING_DEPTH - 1 + 4, buf.len());
    assert_eq!(shallow, codec.load_from_slice(&level_ty(from), &buf)?);

    // One level deeper fails both ways.
    let deep = chain(1);
    let res = codec.save_to_vec(&deep, &level_ty(1));
    assert!(matches!(
        persist_err(res)?,
        PersistError::NestingTooDeep { max, .. } if max == MAX_NESTING_DEPTH
    ));

    let mut buf = vec![1u8; NEST_LEVELS - 1];
    buf.extend_from_slice(&42i32.to_le_bytes());
    let err = codec.load_from_slice(&level_ty(1), &buf).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PersistError>(),
        Some(PersistError::NestingTooDeep { .. })
    ));
    assert!(format!("{err:#}").contains(", innermost 'W"));

    Ok(())
}
