// Built only with `asp/isis`: instantiates the image resource through the gate.
use asp::isis_io::{DiskImageResourceIsis, IsisAdjustCameraModel, IsisCameraModel, PixelBox};

const LABEL: &str = "Object = IsisCube
  Object = Core
    StartByte = 513
    Format = BandSequential
    Group = Dimensions
      Samples = 2
      Lines = 2
      Bands = 1
    End_Group
    Group = Pixels
      Type = UnsignedByte
      ByteOrder = Lsb
    End_Group
  End_Object
End_Object
End
";

fn main() -> Result<(), asp::isis_io::IsisError> {
    let mut bytes = LABEL.as_bytes().to_vec();
    bytes.resize(512, b' ');
    bytes.extend([1, 2, 0, 4]);

    let cube = DiskImageResourceIsis::from_bytes(bytes)?;
    let image = cube.read(PixelBox::new(0, 0, 2, 2))?;
    assert_eq!(image.valid_count(), 3);

    // Each gated name is independently nameable.
    let _: Option<IsisCameraModel> = None;
    let _: Option<IsisAdjustCameraModel> = None;
    Ok(())
}
