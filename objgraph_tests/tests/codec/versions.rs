use super::helpers::fixture::{self, module_version};
use anyhow::Result;
use objgraph_engine::config::{CodecConfig, ENV_VAR_MODULE_VERSION, ENV_VAR_WARN_VERSION_MISMATCH};
use objgraph_engine::VersionMismatch;
use objgraph_types::types::{Fields, TypeRef, Value, Version};
use std::env;
use std::io::Cursor;

pub fn test_versions() -> Result<()> {
    let codec = fixture::codec()?;
    let shape_ty = TypeRef::named("Game.Shape");
    let circle = Value::object(
        TypeRef::named("Game.Circle"),
        Fields::new().with("id", 5i32).with("radius", 2.0f32),
    );
    let buf = codec.save_to_vec(&circle, &shape_ty)?;

    let loaded = codec.load(&shape_ty, &mut Cursor::new(&buf), Some(&module_version()))?;
    assert_eq!(circle, loaded.value);
    assert_eq!(None, loaded.version_mismatch);

    // Data from another version still loads; the mismatch is only reported.
    let older = Version::new(1, 1, 0, 0);
    let loaded = codec.load(&shape_ty, &mut Cursor::new(&buf), Some(&older))?;
    assert_eq!(circle, loaded.value);
    assert_eq!(
        Some(VersionMismatch {
            data_version: older,
            module_version: module_version(),
        }),
        loaded.version_mismatch
    );

    let quiet = CodecConfig {
        warn_version_mismatch: false,
        ..codec.config().clone()
    };
    let quiet_codec = fixture::codec()?.with_config(quiet);
    let loaded = quiet_codec.load(&shape_ty, &mut Cursor::new(&buf), Some(&older))?;
    assert!(loaded.version_mismatch.is_some());

    // Headers carry the declared type and the writing module's version.
    let writer = fixture::codec_with_version("1.0".parse()?)?;
    let mut framed = vec![];
    let w_len = writer.save_with_header(&circle, &shape_ty, &mut framed)?;
    assert_eq!(framed.len(), *w_len);
    assert_eq!(b"\x05Shape\x071.0.0.0", &framed[..14]);
    let loaded = codec.load_with_header(&mut Cursor::new(&framed))?;
    assert_eq!(circle, loaded.value);
    assert_eq!(
        Some(Version::new(1, 0, 0, 0)),
        loaded.version_mismatch.map(|mismatch| mismatch.data_version)
    );

    env::set_var(ENV_VAR_MODULE_VERSION, "3.4.5");
    env::set_var(ENV_VAR_WARN_VERSION_MISMATCH, "false");
    let config = CodecConfig::from_env();
    env::remove_var(ENV_VAR_MODULE_VERSION);
    env::remove_var(ENV_VAR_WARN_VERSION_MISMATCH);
    let config = config?;
    assert_eq!(Version::new(3, 4, 5, 0), config.module_version);
    assert!(!config.warn_version_mismatch);

    Ok(())
}
