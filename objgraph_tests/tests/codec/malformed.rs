use super::helpers::fixture;
use anyhow::Result;
use objgraph_engine::config::CodecConfig;
use objgraph_engine::{ObjectCodec, PersistError};
use objgraph_types::serde::{HomogeneityTag, PrimitiveKind};
use objgraph_types::types::{TypeRef, Value};

/// Loading fails with a plain error, not a classified one.
fn assert_malformed(codec: &ObjectCodec, declared: &TypeRef, buf: &[u8]) {
    let err = codec.load_from_slice(declared, buf).unwrap_err();
    assert!(
        err.downcast_ref::<PersistError>().is_none(),
        "{declared} from {buf:?}: {err:#}"
    );
}

pub fn test_hostile_lengths(codec: &ObjectCodec) -> Result<()> {
    let objects_ty = TypeRef::array(TypeRef::Object);

    // i32::MAX elements, all null, and nothing behind them.
    assert_malformed(codec, &objects_ty, &[0xFF, 0xFF, 0xFF, 0xFF, 0x7F, 0x00]);

    // A string claiming u32::MAX bytes, with one behind it.
    assert_malformed(codec, &TypeRef::string(), &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F, b'a']);

    // 1000 elements declared, 2 present.
    let mut buf = vec![0xFF];
    buf.extend_from_slice(&1000i32.to_le_bytes());
    buf.push(HomogeneityTag::AllDeclaredType as u8);
    buf.extend_from_slice(b"\x05Int32");
    buf.extend_from_slice(&[1, 0, 0, 0, 2, 0, 0, 0]);
    assert_malformed(codec, &TypeRef::list(fixture::int32()), &buf);

    // Negative counts.
    let bytes_ty = TypeRef::array(TypeRef::Primitive(PrimitiveKind::Byte));
    assert_malformed(codec, &bytes_ty, &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_malformed(codec, &objects_ty, &[0xFF, 0x00, 0x00, 0x00, 0x80, 0x00]);

    // Unknown homogeneity tag.
    assert_malformed(codec, &objects_ty, &[1, 9]);

    Ok(())
}

pub fn test_null_run_limit(codec: &ObjectCodec) -> Result<()> {
    let objects_ty = TypeRef::array(TypeRef::Object);
    let strict = CodecConfig {
        max_null_elements: 4,
        ..codec.config().clone()
    };
    let strict_codec = fixture::codec()?.with_config(strict);

    let loaded = strict_codec.load_from_slice(&objects_ty, &[4, 0])?;
    assert_eq!(Value::array(TypeRef::Object, vec![Value::Null; 4]), loaded);
    assert_malformed(&strict_codec, &objects_ty, &[5, 0]);

    Ok(())
}
