use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_dir = PathBuf::from("proto");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=proto/");

    // Point prost/tonic at a vendored protoc binary when none is installed
    // on the system, so the build does not depend on a system-wide protoc.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    // Compile the proto files from the local proto/ directory. The server
    // stubs are only exercised by the client tests.
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &[proto_dir.join("envoy/service/ratelimit/v3/rls.proto")],
            &[&proto_dir],
        )?;

    Ok(())
}
