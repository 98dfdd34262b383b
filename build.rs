//! Build script for newebpay-mpg
//!
//! Generates C header file when the `ffi` feature is enabled.

fn main() {
    #[cfg(feature = "ffi")]
    {
        let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();

        let include_dir = std::path::Path::new(&crate_dir).join("include");
        std::fs::create_dir_all(&include_dir).ok();

        let config = cbindgen::Config::from_file("cbindgen.toml").unwrap_or_default();

        cbindgen::Builder::new()
            .with_crate(&crate_dir)
            .with_config(config)
            .generate()
            .map(|bindings| {
                bindings.write_to_file(include_dir.join("newebpay_mpg.h"));
            })
            .ok();
    }
}
