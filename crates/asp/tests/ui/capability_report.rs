// Consumer that only asks the gate and never names a gated type.
const ISIS: bool = asp::capabilities::isis_enabled();

fn main() {
    let report = asp::capabilities::report();
    let isis = report.iter().find(|status| status.name == "isis").expect("isis is a known capability");

    assert_eq!(isis.present, ISIS);
    assert_eq!(asp::capabilities::is_enabled("isis"), ISIS);
    assert_eq!(asp::capabilities::ENABLED.is_empty(), !ISIS);
    println!("isis: {}", isis.state());
}
