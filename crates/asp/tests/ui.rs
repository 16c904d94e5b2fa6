#[test]
fn capability_gate_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/capability_report.rs");
    t.pass("tests/ui/repeated_imports.rs");
    if cfg!(feature = "isis") {
        t.pass("tests/ui/isis_consumer.rs");
        t.pass("tests/ui/repeated_isis_imports.rs");
    }
}
