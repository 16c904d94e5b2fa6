#![allow(dead_code, unreachable_pub)]

use std::fmt::Write as _;

/// Attached labels are padded to this many bytes, so data starts at `StartByte = LABEL_BYTES + 1`.
pub const LABEL_BYTES: usize = 4096;

/// Builds small synthetic cubes. Values are raw (unscaled) samples in band, line, sample order.
#[derive(Debug, Clone)]
pub struct CubeBuilder {
    pub samples: usize,
    pub lines: usize,
    pub bands: usize,
    pub pixel_type: &'static str,
    pub msb: bool,
    pub tile: Option<(usize, usize)>,
    pub base: f64,
    pub multiplier: f64,
    pub instrument: Option<String>,
    pub values: Vec<f64>,
}

impl CubeBuilder {
    pub fn new(samples: usize, lines: usize, bands: usize, pixel_type: &'static str) -> Self {
        let values = (0..samples * lines * bands).map(|i| (i % 200 + 3) as f64).collect();
        Self {
            samples,
            lines,
            bands,
            pixel_type,
            msb: false,
            tile: None,
            base: 0.0,
            multiplier: 1.0,
            instrument: None,
            values,
        }
    }

    pub fn msb(mut self) -> Self {
        self.msb = true;
        self
    }

    pub fn tiled(mut self, samples: usize, lines: usize) -> Self {
        self.tile = Some((samples, lines));
        self
    }

    pub fn scaled(mut self, base: f64, multiplier: f64) -> Self {
        self.base = base;
        self.multiplier = multiplier;
        self
    }

    pub fn instrument(mut self, keywords: &str) -> Self {
        self.instrument = Some(keywords.to_owned());
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        assert_eq!(values.len(), self.samples * self.lines * self.bands);
        self.values = values;
        self
    }

    pub fn raw(&self, sample: usize, line: usize, band: usize) -> f64 {
        self.values[(band * self.lines + line) * self.samples + sample]
    }

    /// Label text; `core_pointer` switches to a detached label naming that data file.
    pub fn label(&self, start_byte: usize, core_pointer: Option<&str>) -> String {
        let mut label = String::from("Object = IsisCube\n");
        if let Some(file) = core_pointer {
            writeln!(label, "  ^Core = {file}").unwrap();
        }
        label.push_str("  Object = Core\n");
        writeln!(label, "    StartByte = {start_byte}").unwrap();
        match self.tile {
            Some((ts, tl)) => {
                writeln!(label, "    Format = Tile\n    TileSamples = {ts}\n    TileLines = {tl}").unwrap();
            },
            None => label.push_str("    Format = BandSequential\n"),
        }
        writeln!(
            label,
            "    Group = Dimensions\n      Samples = {}\n      Lines = {}\n      Bands = {}\n    End_Group",
            self.samples, self.lines, self.bands
        )
        .unwrap();
        writeln!(
            label,
            "    Group = Pixels\n      Type = {}\n      ByteOrder = {}\n      Base = {:?}\n      Multiplier = {:?}\n    End_Group",
            self.pixel_type,
            if self.msb { "Msb" } else { "Lsb" },
            self.base,
            self.multiplier
        )
        .unwrap();
        label.push_str("  End_Object\n");
        if let Some(instrument) = &self.instrument {
            writeln!(label, "  Group = Instrument\n{instrument}\n  End_Group").unwrap();
        }
        label.push_str("End_Object\nEnd\n");
        label
    }

    /// Sample data laid out as the label declares.
    pub fn data(&self) -> Vec<u8> {
        let size = match self.pixel_type {
            "UnsignedByte" => 1,
            "SignedWord" | "UnsignedWord" => 2,
            _ => 4,
        };
        let zero = vec![0_u8; size];

        match self.tile {
            None => {
                let mut out = Vec::new();
                for value in &self.values {
                    out.extend(self.encode(*value));
                }
                out
            },
            Some((ts, tl)) => {
                let across = self.samples.div_ceil(ts);
                let down = self.lines.div_ceil(tl);
                let mut out = Vec::new();
                for band in 0..self.bands {
                    for tile_row in 0..down {
                        for tile_col in 0..across {
                            for dl in 0..tl {
                                for ds in 0..ts {
                                    let (s, l) = (tile_col * ts + ds, tile_row * tl + dl);
                                    if s < self.samples && l < self.lines {
                                        out.extend(self.encode(self.raw(s, l, band)));
                                    } else {
                                        out.extend(&zero);
                                    }
                                }
                            }
                        }
                    }
                }
                out
            },
        }
    }

    /// A complete attached-label cube.
    pub fn build(&self) -> Vec<u8> {
        let label = self.label(LABEL_BYTES + 1, None);
        assert!(label.len() <= LABEL_BYTES);
        let mut bytes = label.into_bytes();
        bytes.resize(LABEL_BYTES, 0);
        bytes.extend(self.data());
        bytes
    }

    fn encode(&self, value: f64) -> Vec<u8> {
        match (self.pixel_type, self.msb) {
            ("UnsignedByte", _) => vec![value as u8],
            ("SignedWord", false) => (value as i16).to_le_bytes().to_vec(),
            ("SignedWord", true) => (value as i16).to_be_bytes().to_vec(),
            ("UnsignedWord", false) => (value as u16).to_le_bytes().to_vec(),
            ("UnsignedWord", true) => (value as u16).to_be_bytes().to_vec(),
            (_, false) => (value as f32).to_le_bytes().to_vec(),
            (_, true) => (value as f32).to_be_bytes().to_vec(),
        }
    }
}

/// `Instrument` keywords of a nadir-looking camera 1000 units above the origin.
pub const NADIR_INSTRUMENT: &str = "    FocalLength = 100 <mm>\n    PixelPitch = 0.1 <mm>\n    \
    InstrumentPosition = (0.0, 0.0, 1000.0)\n    InstrumentRotation = (0.0, 1.0, 0.0, 0.0)";
