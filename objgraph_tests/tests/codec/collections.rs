use super::helpers::check::{persist_err, round_trip};
use super::helpers::fixture::{int32, single};
use anyhow::Result;
use itertools::Itertools;
use objgraph_engine::{ObjectCodec, PersistError};
use objgraph_types::serde::HomogeneityTag;
use objgraph_types::types::{Fields, TypeRef, Value};

fn shape(ty: &str, id: i32, size: f32) -> Value {
    let size_field = if ty == "Game.Circle" { "radius" } else { "side" };
    Value::object(
        TypeRef::named(ty),
        Fields::new().with("id", id).with(size_field, size),
    )
}

pub fn test_sequences(codec: &ObjectCodec) -> Result<()> {
    let ints = Value::list(int32(), vec![1i32.into(), 2i32.into(), 3i32.into()]);
    let buf = round_trip(codec, &ints, &TypeRef::list(int32()), 20)?;
    assert_eq!(3, buf[0]);
    assert_eq!(HomogeneityTag::AllDeclaredType as u8, buf[1]);
    assert_eq!(b"\x05Int32", &buf[2..8]);

    let mixed = Value::list(TypeRef::Object, vec![2i32.into(), "Hi".into()]);
    let buf = round_trip(codec, &mixed, &TypeRef::list(TypeRef::Object), 24)?;
    assert_eq!(HomogeneityTag::AllDifferentTypes as u8, buf[1]);

    let nulls = Value::array(TypeRef::Object, vec![Value::Null; 3]);
    let buf = round_trip(codec, &nulls, &TypeRef::array(TypeRef::Object), 2)?;
    assert_eq!(vec![3, HomogeneityTag::AllNull as u8], buf);

    let empty = Value::list(TypeRef::string(), vec![]);
    let buf = round_trip(codec, &empty, &TypeRef::list(TypeRef::string()), 1)?;
    assert_eq!(vec![0], buf);

    let types = Value::array(
        TypeRef::Object,
        vec![
            Value::Type(int32()),
            Value::Type(TypeRef::named("Game.Circle")),
        ],
    );
    let buf = round_trip(codec, &types, &TypeRef::array(TypeRef::Object), 2 + 6 + 7)?;
    assert_eq!(HomogeneityTag::AllAreTypeValues as u8, buf[1]);

    // Elements of one subtype share its name, written once.
    let shapes = TypeRef::list(TypeRef::named("Game.Shape"));
    let circles = Value::list(
        TypeRef::named("Game.Shape"),
        vec![
            shape("Game.Circle", 1, 1.0),
            shape("Game.Circle", 2, 2.5),
        ],
    );
    let buf = round_trip(codec, &circles, &shapes, 2 + 7 + 2 * (4 + 4))?;
    assert_eq!(HomogeneityTag::AllSameRuntimeType as u8, buf[1]);
    assert_eq!(b"\x06Circle", &buf[2..9]);

    // Mixed subtypes and nulls are tagged element by element, whatever their order.
    let items = vec![
        shape("Game.Circle", 3, 0.5),
        shape("Game.Square", 4, 8.0),
        Value::Null,
    ];
    for perm in items.into_iter().permutations(3) {
        let mixed = Value::list(TypeRef::named("Game.Shape"), perm);
        let buf = round_trip(codec, &mixed, &shapes, 2 + 2 * (1 + 7 + 4 + 4) + 1)?;
        assert_eq!(HomogeneityTag::AllDifferentTypes as u8, buf[1]);
    }

    // Counts from 255 up take 5 bytes.
    let many = Value::list(int32(), (0..300i32).map(Value::from).collect());
    round_trip(codec, &many, &TypeRef::list(int32()), 5 + 1 + 6 + 300 * 4)?;

    // Elements must fit the declared element type.
    let wrong = Value::list(single(), vec![1i32.into()]);
    let res = codec.save_to_vec(&wrong, &TypeRef::list(single()));
    assert!(matches!(
        persist_err(res)?,
        PersistError::ValueMismatch { .. }
    ));

    Ok(())
}

pub fn test_dictionaries(codec: &ObjectCodec) -> Result<()> {
    let string_to_int = TypeRef::dictionary(TypeRef::string(), int32());
    let scores = Value::dictionary(
        TypeRef::string(),
        int32(),
        vec![("a".into(), 1i32.into()), ("b".into(), 2i32.into())],
    );
    let buf = round_trip(codec, &scores, &string_to_int, 2 + 7 + 6 + 2 * (2 + 4))?;
    assert_eq!(HomogeneityTag::AllDeclaredType as u8, buf[1]);

    let empty = Value::dictionary(TypeRef::string(), int32(), vec![]);
    round_trip(codec, &empty, &string_to_int, 1)?;

    // Values of differing types, and null values, are tagged entry by entry.
    let string_to_object = TypeRef::dictionary(TypeRef::string(), TypeRef::Object);
    let bag = Value::dictionary(
        TypeRef::string(),
        TypeRef::Object,
        vec![
            ("n".into(), 1i32.into()),
            ("z".into(), Value::Null),
            ("s".into(), "x".into()),
        ],
    );
    let buf = round_trip(
        codec,
        &bag,
        &string_to_object,
        2 + 7 + (1 + 6 + 2 + 4) + (1 + 2) + (1 + 7 + 2 + 2),
    )?;
    assert_eq!(HomogeneityTag::AllDifferentTypes as u8, buf[1]);

    // Keys share one type name, so they must share one runtime type.
    let object_to_int = TypeRef::dictionary(TypeRef::Object, int32());
    let mixed_keys = Value::dictionary(
        TypeRef::Object,
        int32(),
        vec![("a".into(), 1i32.into()), (2i32.into(), 2i32.into())],
    );
    let res = codec.save_to_vec(&mixed_keys, &object_to_int);
    assert_eq!(
        PersistError::MixedDictionaryKeys {
            first: String::from("String"),
            other: String::from("Int32"),
        },
        persist_err(res)?
    );

    let null_key = Value::dictionary(
        TypeRef::string(),
        int32(),
        vec![(Value::Null, 1i32.into())],
    );
    let res = codec.save_to_vec(&null_key, &string_to_int);
    assert!(matches!(
        persist_err(res)?,
        PersistError::MixedDictionaryKeys { .. }
    ));

    Ok(())
}
