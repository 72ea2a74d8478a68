use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let include_dir = crate_dir.join("include");
    println!("cargo:rerun-if-changed=src");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("CAUSALITY_H")
        .generate()
    {
        Ok(bindings) => {
            let _ = std::fs::create_dir_all(&include_dir);
            bindings.write_to_file(include_dir.join("causality.h"));
        }
        Err(err) => println!("cargo:warning=cbindgen skipped: {err}"),
    }
}
