fn main() {
    let isis_enabled = std::env::var_os("CARGO_FEATURE_ISIS").is_some();

    // Read by direct dependents as `DEP_ASP_ISIS`; see `asp::capabilities`.
    println!("cargo:isis={}", u8::from(isis_enabled));

    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_ISIS");
    println!("cargo:rerun-if-changed=build.rs");
}
