//! Cube geometry and pixel encoding, as described by the `IsisCube/Core` label object.

use crate::error::{IsisError, IsisErrorExt};
use crate::pvl::{Pvl, PvlObject};
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use std::fmt;
use std::path::PathBuf;

/// Storage type of one sample (`Pixels/Type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    UnsignedByte,
    SignedWord,
    UnsignedWord,
    Real,
}

impl PixelType {
    fn parse(raw: &str) -> Result<Self, IsisError> {
        match raw.to_ascii_lowercase().as_str() {
            "unsignedbyte" => Ok(Self::UnsignedByte),
            "signedword" => Ok(Self::SignedWord),
            "unsignedword" => Ok(Self::UnsignedWord),
            "real" => Ok(Self::Real),
            "signedinteger" | "unsignedinteger" | "double" => {
                Err(IsisError::unsupported(format!("pixel type {raw}")))
            },
            _ => Err(IsisError::invalid("Pixels/Type", raw)),
        }
    }

    /// Bytes per stored sample.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::UnsignedByte => 1,
            Self::SignedWord | Self::UnsignedWord => 2,
            Self::Real => 4,
        }
    }

    /// Raw (unscaled) range of valid, non-special values.
    #[must_use]
    pub const fn valid_raw_range(self) -> (f64, f64) {
        match self {
            Self::UnsignedByte => (special::VALID_MIN1 as f64, special::VALID_MAX1 as f64),
            Self::SignedWord => (special::VALID_MIN2 as f64, special::VALID_MAX2 as f64),
            Self::UnsignedWord => (special::VALID_MINU2 as f64, special::VALID_MAXU2 as f64),
            Self::Real => (special::VALID_MIN4 as f64, f32::MAX as f64),
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsignedByte => "UnsignedByte",
            Self::SignedWord => "SignedWord",
            Self::UnsignedWord => "UnsignedWord",
            Self::Real => "Real",
        };
        f.write_str(name)
    }
}

/// Byte order of stored samples (`Pixels/ByteOrder`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Lsb,
    Msb,
}

/// Sample layout on disk (`Core/Format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFormat {
    /// Whole band after whole band, lines top to bottom.
    BandSequential,
    /// Fixed-size tiles, row-major within a band; edge tiles are padded to full size.
    Tile { samples: usize, lines: usize },
}

/// Special pixel classes shared by every ISIS pixel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialPixel {
    Null,
    LowRepresentationSaturation,
    LowInstrumentSaturation,
    HighInstrumentSaturation,
    HighRepresentationSaturation,
}

/// ISIS special pixel constants (see `SpecialPixel.h` in ISIS).
pub mod special {
    pub const NULL1: u8 = 0;
    pub const HIGH_REPR_SAT1: u8 = 255;
    pub const VALID_MIN1: u8 = 1;
    pub const VALID_MAX1: u8 = 254;

    pub const NULL2: i16 = -32768;
    pub const LOW_REPR_SAT2: i16 = -32767;
    pub const LOW_INSTR_SAT2: i16 = -32766;
    pub const HIGH_INSTR_SAT2: i16 = -32765;
    pub const HIGH_REPR_SAT2: i16 = -32764;
    pub const VALID_MIN2: i16 = -32752;
    pub const VALID_MAX2: i16 = 32767;

    pub const NULLU2: u16 = 0;
    pub const LOW_REPR_SATU2: u16 = 1;
    pub const LOW_INSTR_SATU2: u16 = 2;
    pub const HIGH_INSTR_SATU2: u16 = 65534;
    pub const HIGH_REPR_SATU2: u16 = 65535;
    pub const VALID_MINU2: u16 = 3;
    pub const VALID_MAXU2: u16 = 65522;

    pub const NULL4: u32 = 0xFF7F_FFFB;
    pub const LOW_REPR_SAT4: u32 = 0xFF7F_FFFC;
    pub const LOW_INSTR_SAT4: u32 = 0xFF7F_FFFD;
    pub const HIGH_INSTR_SAT4: u32 = 0xFF7F_FFFE;
    pub const HIGH_REPR_SAT4: u32 = 0xFF7F_FFFF;
    /// Smallest valid `Real` value (bit pattern `0xFF7FFFFA`).
    pub const VALID_MIN4: f32 = f32::from_bits(0xFF7F_FFFA);
}

impl SpecialPixel {
    #[must_use]
    pub const fn classify_u8(raw: u8) -> Option<Self> {
        match raw {
            special::NULL1 => Some(Self::Null),
            special::HIGH_REPR_SAT1 => Some(Self::HighRepresentationSaturation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn classify_i16(raw: i16) -> Option<Self> {
        match raw {
            special::NULL2 => Some(Self::Null),
            special::LOW_REPR_SAT2 => Some(Self::LowRepresentationSaturation),
            special::LOW_INSTR_SAT2 => Some(Self::LowInstrumentSaturation),
            special::HIGH_INSTR_SAT2 => Some(Self::HighInstrumentSaturation),
            special::HIGH_REPR_SAT2 => Some(Self::HighRepresentationSaturation),
            // Reserved gap below VALID_MIN2 carries no data.
            v if v < special::VALID_MIN2 => Some(Self::Null),
            _ => None,
        }
    }

    #[must_use]
    pub const fn classify_u16(raw: u16) -> Option<Self> {
        match raw {
            special::NULLU2 => Some(Self::Null),
            special::LOW_REPR_SATU2 => Some(Self::LowRepresentationSaturation),
            special::LOW_INSTR_SATU2 => Some(Self::LowInstrumentSaturation),
            special::HIGH_INSTR_SATU2 => Some(Self::HighInstrumentSaturation),
            special::HIGH_REPR_SATU2 => Some(Self::HighRepresentationSaturation),
            v if v > special::VALID_MAXU2 => Some(Self::Null),
            _ => None,
        }
    }

    #[must_use]
    pub fn classify_f32(raw: f32) -> Option<Self> {
        match raw.to_bits() {
            special::NULL4 => Some(Self::Null),
            special::LOW_REPR_SAT4 => Some(Self::LowRepresentationSaturation),
            special::LOW_INSTR_SAT4 => Some(Self::LowInstrumentSaturation),
            special::HIGH_INSTR_SAT4 => Some(Self::HighInstrumentSaturation),
            special::HIGH_REPR_SAT4 => Some(Self::HighRepresentationSaturation),
            _ if !raw.is_finite() => Some(Self::Null),
            _ => None,
        }
    }
}

/// Everything needed to locate and decode samples of a cube.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeLabel {
    pub samples: usize,
    pub lines: usize,
    pub bands: usize,
    pub pixel_type: PixelType,
    pub byte_order: ByteOrder,
    pub base: f64,
    pub multiplier: f64,
    pub format: CubeFormat,
    /// 0-based offset of the first sample in the data file.
    pub data_offset: u64,
    /// Data file named by a detached label's `^Core` pointer, relative to the label.
    pub data_file: Option<PathBuf>,
}

impl CubeLabel {
    /// Extracts the cube description from a parsed label.
    ///
    /// # Errors
    /// Returns an error if required keywords are missing or carry invalid values.
    pub fn from_pvl(pvl: &Pvl) -> Result<Self, IsisError> {
        let cube = pvl.root().require_object("IsisCube")?;
        let core = cube.require_object("Core")?;
        let (data_file, pointer_offset) = core_pointer(cube)?;

        let dims = core.require_group("Dimensions")?;
        let samples: usize = dims.require("Samples")?.parse()?;
        let lines: usize = dims.require("Lines")?.parse()?;
        let bands: usize = dims.require("Bands")?.parse()?;
        if samples == 0 || lines == 0 || bands == 0 {
            return Err(IsisError::invalid("Core/Dimensions", format!("{samples}x{lines}x{bands}")));
        }

        let pixels = core.require_group("Pixels")?;
        let pixel_type = PixelType::parse(pixels.require("Type")?.value().unwrap_or_default())?;
        let byte_order = match pixels.keyword("ByteOrder").and_then(|k| k.value()) {
            None => ByteOrder::Lsb,
            Some(v) if v.eq_ignore_ascii_case("lsb") => ByteOrder::Lsb,
            Some(v) if v.eq_ignore_ascii_case("msb") => ByteOrder::Msb,
            Some(v) => return Err(IsisError::invalid("Pixels/ByteOrder", v)),
        };
        let base = pixels.keyword("Base").map_or(Ok(0.0), |k| k.parse())?;
        let multiplier = pixels.keyword("Multiplier").map_or(Ok(1.0), |k| k.parse())?;

        let format = parse_format(core)?;

        let start_byte: u64 = match core.keyword("StartByte") {
            Some(k) => k.parse()?,
            None => pointer_offset.unwrap_or(1),
        };
        if start_byte == 0 {
            return Err(IsisError::invalid("Core/StartByte", "0"));
        }

        let label = Self {
            samples,
            lines,
            bands,
            pixel_type,
            byte_order,
            base,
            multiplier,
            format,
            data_offset: start_byte - 1,
            data_file,
        };
        label.data_end()?;
        Ok(label)
    }

    /// Number of bytes the sample data occupies, padding tiles included.
    ///
    /// # Errors
    /// Returns [`IsisError::InvalidValue`] for dimensions whose byte size overflows `u64`.
    pub fn data_len(&self) -> Result<u64, IsisError> {
        let overflow =
            || IsisError::invalid("Core/Dimensions", format!("{}x{}x{}", self.samples, self.lines, self.bands));
        let padded = |extent: usize, tile: usize| extent.div_ceil(tile).checked_mul(tile);

        let per_band = match self.format {
            CubeFormat::BandSequential => self.samples.checked_mul(self.lines),
            CubeFormat::Tile { samples, lines } => {
                padded(self.samples, samples).zip(padded(self.lines, lines)).and_then(|(s, l)| s.checked_mul(l))
            },
        };
        per_band
            .and_then(|n| n.checked_mul(self.bands))
            .and_then(|n| n.checked_mul(self.pixel_type.size()))
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(overflow)
    }

    /// Absolute offset one past the last data byte.
    ///
    /// # Errors
    /// Returns [`IsisError::InvalidValue`] if the data extent overflows `u64`.
    pub fn data_end(&self) -> Result<u64, IsisError> {
        self.data_offset
            .checked_add(self.data_len()?)
            .ok_or_else(|| IsisError::invalid("Core/StartByte", (self.data_offset + 1).to_string()))
    }

    /// Valid (non-special) value range after applying base and multiplier.
    #[must_use]
    pub fn valid_range(&self) -> (f64, f64) {
        let (lo, hi) = self.pixel_type.valid_raw_range();
        let a = self.multiplier.mul_add(lo, self.base);
        let b = self.multiplier.mul_add(hi, self.base);
        (a.min(b), a.max(b))
    }

    /// Byte runs (absolute offset, first sample, sample count) covering samples
    /// `start..start + count` of one line of one band.
    pub(crate) fn row_runs(
        &self,
        band: usize,
        line: usize,
        start: usize,
        count: usize,
    ) -> Vec<(u64, usize, usize)> {
        let size = self.pixel_type.size();
        match self.format {
            CubeFormat::BandSequential => {
                let index = (band * self.lines + line) * self.samples + start;
                vec![(self.data_offset + (index * size) as u64, start, count)]
            },
            CubeFormat::Tile { samples: ts, lines: tl } => {
                let tiles_across = self.samples.div_ceil(ts);
                let tiles_down = self.lines.div_ceil(tl);
                let tile_bytes = ts * tl * size;
                let tile_row = line / tl;
                let line_in_tile = line % tl;

                let mut runs = Vec::new();
                let end = start + count;
                let mut sample = start;
                while sample < end {
                    let tile_col = sample / ts;
                    let run_end = end.min((tile_col + 1) * ts);
                    let tile_index = (band * tiles_down + tile_row) * tiles_across + tile_col;
                    let within = (line_in_tile * ts + sample % ts) * size;
                    let offset = self.data_offset + (tile_index * tile_bytes + within) as u64;
                    runs.push((offset, sample, run_end - sample));
                    sample = run_end;
                }
                runs
            },
        }
    }

    /// Decodes raw bytes into scaled values; special pixels become NaN.
    pub(crate) fn decode(&self, raw: &[u8], out: &mut Vec<f32>) {
        let size = self.pixel_type.size();
        for chunk in raw.chunks_exact(size) {
            let value = match (self.pixel_type, self.byte_order) {
                (PixelType::UnsignedByte, _) => {
                    let v = chunk[0];
                    SpecialPixel::classify_u8(v).map_or(Some(f64::from(v)), |_| None)
                },
                (PixelType::SignedWord, order) => {
                    let v = match order {
                        ByteOrder::Lsb => LittleEndian::read_i16(chunk),
                        ByteOrder::Msb => BigEndian::read_i16(chunk),
                    };
                    SpecialPixel::classify_i16(v).map_or(Some(f64::from(v)), |_| None)
                },
                (PixelType::UnsignedWord, order) => {
                    let v = match order {
                        ByteOrder::Lsb => LittleEndian::read_u16(chunk),
                        ByteOrder::Msb => BigEndian::read_u16(chunk),
                    };
                    SpecialPixel::classify_u16(v).map_or(Some(f64::from(v)), |_| None)
                },
                (PixelType::Real, order) => {
                    let v = match order {
                        ByteOrder::Lsb => LittleEndian::read_f32(chunk),
                        ByteOrder::Msb => BigEndian::read_f32(chunk),
                    };
                    SpecialPixel::classify_f32(v).map_or(Some(f64::from(v)), |_| None)
                },
            };

            #[allow(clippy::cast_possible_truncation)]
            out.push(value.map_or(f32::NAN, |v| self.multiplier.mul_add(v, self.base) as f32));
        }
    }
}

fn parse_format(core: &PvlObject) -> Result<CubeFormat, IsisError> {
    let raw = core.keyword("Format").and_then(|k| k.value()).unwrap_or("Tile");
    if raw.eq_ignore_ascii_case("bandsequential") {
        return Ok(CubeFormat::BandSequential);
    }
    if !raw.eq_ignore_ascii_case("tile") {
        return Err(IsisError::invalid("Core/Format", raw));
    }

    let samples: usize = core.require("TileSamples")?.parse()?;
    let lines: usize = core.require("TileLines")?.parse()?;
    if samples == 0 || lines == 0 {
        return Err(IsisError::invalid("Core/TileSamples", format!("{samples}x{lines}")));
    }
    Ok(CubeFormat::Tile { samples, lines })
}

/// Reads the `^Core` pointer of a detached label: `^Core = file.cub` or `^Core = (file.cub, 1025)`.
fn core_pointer(cube: &PvlObject) -> Result<(Option<PathBuf>, Option<u64>), IsisError> {
    let Some(pointer) = cube.keyword("^Core") else {
        return Ok((None, None));
    };

    let file = pointer.value().map(PathBuf::from);
    let offset = match pointer.values().get(1) {
        Some(raw) => Some(
            raw.parse::<u64>()
                .map_err(|_| IsisError::invalid("^Core", raw.as_str()))
                .context("pointer offset")?,
        ),
        None => None,
    };
    Ok((file, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(core: &str) -> Pvl {
        Pvl::parse(&format!("Object = IsisCube\nObject = Core\n{core}\nEnd_Object\nEnd_Object\nEnd\n"))
            .unwrap()
    }

    const DIMS: &str = "Group = Dimensions\nSamples = 5\nLines = 3\nBands = 2\nEnd_Group\n";

    #[test]
    fn band_sequential_offsets_are_linear() {
        let pvl = label(&format!(
            "StartByte = 101\nFormat = BandSequential\n{DIMS}Group = Pixels\nType = SignedWord\nByteOrder = Msb\nEnd_Group"
        ));
        let cube = CubeLabel::from_pvl(&pvl).unwrap();
        assert_eq!(cube.data_offset, 100);
        assert_eq!(cube.byte_order, ByteOrder::Msb);
        assert_eq!(cube.data_len().unwrap(), 5 * 3 * 2 * 2);
        // band 1, line 2, sample 3 -> index (1*3 + 2)*5 + 3 = 28
        assert_eq!(cube.row_runs(1, 2, 3, 2), vec![(100 + 56, 3, 2)]);
    }

    #[test]
    fn tile_runs_split_at_tile_edges() {
        let pvl = label(&format!(
            "StartByte = 1\nFormat = Tile\nTileSamples = 2\nTileLines = 2\n{DIMS}Group = Pixels\nType = UnsignedByte\nEnd_Group"
        ));
        let cube = CubeLabel::from_pvl(&pvl).unwrap();
        // 3 tiles across, 2 down, 4 bytes per tile, padded to 6x4 per band.
        assert_eq!(cube.data_len().unwrap(), 6 * 4 * 2);

        let runs = cube.row_runs(0, 2, 1, 4);
        // line 2 -> tile row 1, first line of the tile; samples 1..5 span tile columns 0, 1, 2.
        assert_eq!(runs, vec![(3 * 4 + 1, 1, 1), (4 * 4, 2, 2), (5 * 4, 4, 1)]);

        let second_band = cube.row_runs(1, 1, 0, 1);
        assert_eq!(second_band, vec![(6 * 4 + 2, 0, 1)]);
    }

    #[test]
    fn unsupported_pixel_types_are_reported() {
        let pvl = label(&format!("{DIMS}Group = Pixels\nType = Double\nEnd_Group\nFormat = BandSequential"));
        let err = CubeLabel::from_pvl(&pvl).unwrap_err();
        assert!(matches!(err, IsisError::Unsupported { .. }), "{err}");
    }

    #[test]
    fn special_pixels_decode_to_nan() {
        let pvl = label(&format!(
            "Format = BandSequential\n{DIMS}Group = Pixels\nType = SignedWord\nByteOrder = Lsb\nBase = 10.0\nMultiplier = 0.5\nEnd_Group"
        ));
        let cube = CubeLabel::from_pvl(&pvl).unwrap();

        let mut raw = Vec::new();
        for v in [special::NULL2, 4_i16, special::HIGH_REPR_SAT2, -32760] {
            raw.extend_from_slice(&v.to_le_bytes());
        }
        let mut out = Vec::new();
        cube.decode(&raw, &mut out);

        assert!(out[0].is_nan());
        assert!((out[1] - 12.0).abs() < f32::EPSILON);
        assert!(out[2].is_nan());
        assert!(out[3].is_nan(), "reserved range below VALID_MIN2 is not data");
    }

    #[test]
    fn real_special_bit_patterns_are_recognised() {
        assert_eq!(SpecialPixel::classify_f32(f32::from_bits(special::NULL4)), Some(SpecialPixel::Null));
        assert_eq!(
            SpecialPixel::classify_f32(f32::from_bits(special::HIGH_INSTR_SAT4)),
            Some(SpecialPixel::HighInstrumentSaturation)
        );
        assert_eq!(SpecialPixel::classify_f32(1.5), None);
        assert_eq!(SpecialPixel::classify_f32(special::VALID_MIN4), None);
        assert_eq!(special::VALID_MIN4.to_bits(), 0xFF7F_FFFA);
        assert_eq!(special::VALID_MIN4.to_bits() + 1, special::NULL4);
    }

    #[test]
    fn valid_range_follows_scaling() {
        let pvl = label(&format!(
            "Format = BandSequential\n{DIMS}Group = Pixels\nType = UnsignedByte\nBase = 100.0\nMultiplier = -1.0\nEnd_Group"
        ));
        let cube = CubeLabel::from_pvl(&pvl).unwrap();
        assert_eq!(cube.valid_range(), (-154.0, 99.0));

        let pvl = label(&format!(
            "Format = BandSequential\n{DIMS}Group = Pixels\nType = Real\nBase = 1.0\nMultiplier = 2.0\nEnd_Group"
        ));
        let real = CubeLabel::from_pvl(&pvl).unwrap();
        let (lo, hi) = real.valid_range();
        assert_eq!(lo, 2.0f64.mul_add(f64::from(special::VALID_MIN4), 1.0));
        assert_eq!(hi, 2.0f64.mul_add(f64::from(f32::MAX), 1.0));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let huge = "Group = Dimensions\nSamples = 4294967296\nLines = 4294967296\nBands = 1\nEnd_Group\n";
        for format in ["Format = BandSequential", "Format = Tile\nTileSamples = 128\nTileLines = 128"] {
            let pvl = label(&format!("{format}\n{huge}Group = Pixels\nType = Real\nEnd_Group"));
            let err = CubeLabel::from_pvl(&pvl).unwrap_err();
            assert!(
                matches!(&err, IsisError::InvalidValue { keyword, .. } if keyword == "Core/Dimensions"),
                "{format}: {err}"
            );
        }

        let pvl = label(&format!(
            "StartByte = 18446744073709551615\nFormat = BandSequential\n{DIMS}Group = Pixels\nType = Real\nEnd_Group"
        ));
        let err = CubeLabel::from_pvl(&pvl).unwrap_err();
        assert!(matches!(&err, IsisError::InvalidValue { keyword, .. } if keyword == "Core/StartByte"), "{err}");
    }

    #[test]
    fn detached_pointer_supplies_file_and_offset() {
        let pvl = Pvl::parse(&format!(
            "Object = IsisCube\n^Core = (data.cub, 17)\nObject = Core\nFormat = BandSequential\n{DIMS}Group = Pixels\nType = Real\nEnd_Group\nEnd_Object\nEnd_Object\nEnd\n"
        ))
        .unwrap();
        let cube = CubeLabel::from_pvl(&pvl).unwrap();
        assert_eq!(cube.data_file.as_deref(), Some(std::path::Path::new("data.cub")));
        assert_eq!(cube.data_offset, 16);
    }
}
