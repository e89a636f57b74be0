use super::helpers::check::{persist_err, round_trip};
use anyhow::Result;
use objgraph_engine::{ObjectCodec, PersistError};
use objgraph_types::serde::{Decimal, Primitive, PrimitiveKind};
use objgraph_types::types::{EnumValue, StreamKind, StreamValue, TypeRef, Value};

pub fn test_primitives(codec: &ObjectCodec) -> Result<()> {
    let cases: Vec<(Value, usize)> = vec![
        (Value::from(true), 1),
        (Value::from(0xABu8), 1),
        (Value::from(-7i8), 1),
        (Value::from(-300i16), 2),
        (Value::from(60_000u16), 2),
        (Value::from(i32::MIN), 4),
        (Value::from(u32::MAX), 4),
        (Value::from(-1i64), 8),
        (Value::from(u64::MAX), 8),
        (Value::from(1.5f32), 4),
        (Value::from(-0.25f64), 8),
        (Value::from(Decimal::new(-12_345, 3)?), Decimal::BYTE_LEN),
        (Value::from('é'), 2),
        (Value::from(""), 1),
        // Multi-byte chars count in bytes.
        (Value::from("héllo"), 7),
    ];
    for (value, expected_len) in cases.iter() {
        let declared = value.runtime_type().unwrap();
        round_trip(codec, value, &declared, *expected_len)?;
    }

    let blue = Value::Enum(EnumValue {
        ty: "Game.Color".into(),
        raw: Primitive::Byte(2),
    });
    let buf = round_trip(codec, &blue, &TypeRef::named("Game.Color"), 1)?;
    assert_eq!(vec![2], buf);

    // A type used as a value is saved as its name.
    let ty = TypeRef::list(TypeRef::named("Game.Point"));
    let name = codec.registry().type_name(&ty);
    assert_eq!("List<Point>", name);
    round_trip(codec, &Value::Type(ty), &TypeRef::TypeValue, 1 + name.len())?;

    // Declared as object, the runtime type name precedes the value.
    let buf = round_trip(codec, &Value::from(5i64), &TypeRef::Object, 6 + 8)?;
    assert_eq!(b"\x05Int64", &buf[..6]);
    let n: i64 = codec.load_from_slice(&TypeRef::Object, &buf)?.try_into()?;
    assert_eq!(5, n);
    let res: Result<String> = codec.load_from_slice(&TypeRef::Object, &buf)?.try_into();
    assert!(res.is_err());

    // Malformed input is not a classified failure.
    let int32 = TypeRef::Primitive(PrimitiveKind::Int32);
    let err = codec.load_from_slice(&int32, &[1, 2]).unwrap_err();
    assert!(err.downcast_ref::<PersistError>().is_none());
    let err = codec.load_from_slice(&int32, &[0; 5]).unwrap_err();
    assert!(err.to_string().contains("trailing"));

    // A value that does not fit its declared type.
    let res = codec.save_to_vec(&Value::from(1i32), &TypeRef::string());
    assert_eq!(
        PersistError::ValueMismatch {
            declared: String::from("String"),
            actual: String::from("Int32"),
        },
        persist_err(res)?
    );

    Ok(())
}

pub fn test_buffers_and_streams(codec: &ObjectCodec) -> Result<()> {
    let byte_array = TypeRef::array(TypeRef::Primitive(PrimitiveKind::Byte));
    assert_eq!(TypeRef::ByteBuffer, byte_array);
    let buf = round_trip(codec, &Value::Bytes(vec![7, 8, 9]), &byte_array, 1 + 3)?;
    assert_eq!(vec![3, 7, 8, 9], buf);

    round_trip(codec, &Value::Chars(vec!['a', 'é']), &TypeRef::CharBuffer, 1 + 2 * 2)?;

    // Lengths from 255 up take the marker byte and 4 more.
    let stream = Value::Stream(StreamValue::memory(vec![9; 300]));
    let buf = round_trip(codec, &stream, &TypeRef::MemoryStream, 5 + 300)?;
    assert_eq!(vec![0xFF, 0x2C, 0x01, 0, 0], buf[..5].to_vec());

    let file_stream = Value::Stream(StreamValue {
        kind: StreamKind::File,
        bytes: vec![1],
    });
    let res = codec.save_to_vec(&file_stream, &TypeRef::MemoryStream);
    assert_eq!(
        PersistError::UnsupportedStreamKind(StreamKind::File),
        persist_err(res)?
    );

    Ok(())
}
