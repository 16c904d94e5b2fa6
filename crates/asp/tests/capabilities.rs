use asp::capabilities::{self, ENABLED, ISIS_ENABLED};
use asp::domain::capabilities::CapabilitySet;

// Usable in const context.
const ISIS: bool = capabilities::isis_enabled();

#[test]
fn flag_matches_the_cargo_feature() {
    assert_eq!(ISIS, cfg!(feature = "isis"));
    assert_eq!(ISIS_ENABLED, ISIS);
}

#[test]
fn enabled_list_and_set_agree() {
    assert_eq!(capabilities::is_enabled("isis"), ISIS);
    assert!(!capabilities::is_enabled("vicar"));
    assert_eq!(capabilities::enabled_set().contains(CapabilitySet::ISIS), ISIS);
    assert_eq!(capabilities::enabled_set().names(), ENABLED);
}

#[test]
fn report_lists_every_known_capability() {
    let report = capabilities::report();
    assert_eq!(report.len(), CapabilitySet::KNOWN.len());

    let isis = report.iter().find(|status| status.name == "isis").unwrap();
    assert_eq!(isis.present, ISIS);
    assert_eq!(isis.state(), if ISIS { "present" } else { "absent" });
}

#[cfg(feature = "isis")]
#[test]
fn gated_types_are_reachable_through_the_facade() {
    use asp::isis_io::{DiskImageResourceIsis, IsisError, PixelBox};

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.cub");
    let err = DiskImageResourceIsis::open(&missing).unwrap_err();
    assert!(matches!(err, IsisError::Io { .. }));
    assert!(PixelBox::full(2, 2).fits_within(2, 2));
}
