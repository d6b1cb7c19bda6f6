//! Generates foreign-language bindings for `mintkit-core`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
