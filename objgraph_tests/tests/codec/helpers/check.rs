use anyhow::{anyhow, Result};
use objgraph_engine::{ObjectCodec, PersistError};
use objgraph_types::types::{TypeRef, Value};

/// Saves, checks the byte count, loads back, and checks that the value survived.
pub fn round_trip(
    codec: &ObjectCodec,
    value: &Value,
    declared: &TypeRef,
    expected_len: usize,
) -> Result<Vec<u8>> {
    let buf = codec.save_to_vec(value, declared)?;
    assert_eq!(expected_len, buf.len(), "Saved length of {value:?}");

    let loaded = codec.load_from_slice(declared, &buf)?;
    assert_eq!(value, &loaded);

    Ok(buf)
}

/// The classified cause of a failed call.
pub fn persist_err<T: std::fmt::Debug>(res: Result<T>) -> Result<PersistError> {
    let err = match res {
        Ok(v) => return Err(anyhow!("Expected a failure, got {v:?}")),
        Err(err) => err,
    };
    err.downcast_ref::<PersistError>()
        .cloned()
        .ok_or_else(|| anyhow!("Not a PersistError: {err:#}"))
}
