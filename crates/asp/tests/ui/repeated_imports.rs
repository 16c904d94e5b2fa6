use asp::capabilities::*;
use asp::capabilities::{self, ENABLED, is_enabled};
use asp::domain::capabilities::CapabilitySet;
use asp::kernel::domain::capabilities::CapabilitySet as KernelCapabilitySet;

mod nested {
    pub use asp::capabilities::*;
    pub use asp::capabilities::isis_enabled;
}

fn main() {
    let set: CapabilitySet = enabled_set();
    let same: KernelCapabilitySet = capabilities::enabled_set();
    assert_eq!(set, same);
    assert_eq!(nested::isis_enabled(), ISIS_ENABLED);
    assert!(ENABLED.iter().all(|name| is_enabled(name)));
}
