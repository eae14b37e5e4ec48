fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }
    let well_known = protoc_bin_vendored::include_path()?;

    println!("cargo:rerun-if-changed=proto/tfplugin6.9.proto");
    tonic_build::configure()
        .build_client(false)
        .compile_protos(
            &["proto/tfplugin6.9.proto"],
            &[std::path::PathBuf::from("proto"), well_known],
        )?;
    Ok(())
}
