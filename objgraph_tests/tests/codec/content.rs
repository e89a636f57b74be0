use super::helpers::check::round_trip;
use anyhow::Result;
use objgraph_engine::{ObjectCodec, PersistError};
use objgraph_types::types::{Fields, TypeRef, Value};

pub fn test_content_references(codec: &ObjectCodec) -> Result<()> {
    let image_ty = TypeRef::named("Engine.Image");

    // Loaded content is saved by name only, and loaded again through the content loader.
    let some_xml = Value::content("Engine.Image", "SomeXml", Fields::new());
    let buf = codec.save_to_vec(&some_xml, &image_ty)?;
    assert_eq!(b"\x07SomeXml".to_vec(), buf);
    let loaded = codec.load_from_slice(&image_ty, &buf)?;
    assert_eq!(Some(&Value::from(1024i32)), loaded.field("width"));
    assert_eq!(Some(&Value::from(768i32)), loaded.field("height"));

    // The content root is open, so its subtypes carry their name.
    let content_ty = TypeRef::named("Engine.Content");
    let buf = codec.save_to_vec(&some_xml, &content_ty)?;
    assert_eq!(b"\x05Image\x07SomeXml".to_vec(), buf);
    let reloaded = codec.load_from_slice(&content_ty, &buf)?;
    assert_eq!(loaded, reloaded);

    // Content generated at runtime has no asset to load from, so its fields follow its name.
    let generated = Value::content(
        "Engine.Image",
        "<GeneratedImage1",
        Fields::new().with("width", 3i32).with("height", 4i32),
    );
    round_trip(codec, &generated, &image_ty, 17 + 4 + 4)?;

    let err = codec
        .load_from_slice(&image_ty, b"\x07Missing")
        .unwrap_err();
    assert!(err.downcast_ref::<PersistError>().is_none());
    assert!(format!("{err:#}").contains("Content 'Missing' could not be loaded"));

    Ok(())
}
