use asp::isis_io::*;
use asp::isis_io::{DiskImageResourceIsis, IsisCameraModel};
use asp::isis_io::DiskImageResourceIsis as Resource;

mod again {
    pub use asp::isis_io::*;
}

fn open(path: &str) -> Result<Resource, IsisError> {
    DiskImageResourceIsis::open(path)
}

fn main() {
    let _ = again::PixelBox::new(0, 0, 1, 1);
    let _: fn(&DiskImageResourceIsis) -> Result<IsisCameraModel, IsisError> = IsisCameraModel::from_resource;
    assert!(open("/nonexistent.cub").is_err());
}
