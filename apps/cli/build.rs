fn main() {
    // Mirror the facade's ISIS flag; `DEP_ASP_ISIS` comes from the `asp` build we link against.
    println!("cargo:rustc-check-cfg=cfg(asp_isis)");
    if std::env::var("DEP_ASP_ISIS").as_deref() == Ok("1") {
        println!("cargo:rustc-cfg=asp_isis");
    }

    println!("cargo:rerun-if-env-changed=DEP_ASP_ISIS");
}
