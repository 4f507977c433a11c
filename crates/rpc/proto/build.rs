use std::{env, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let protos = ["proto/stash/file/v1/file.proto"];

    tonic_build::configure()
        .file_descriptor_set_path(out_dir.join("stash_descriptor.bin"))
        .bytes(["."])
        .compile_protos(&protos, &["proto"])?;

    for proto in protos {
        println!("cargo:rerun-if-changed={proto}");
    }
    Ok(())
}
