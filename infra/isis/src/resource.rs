use crate::cube::{CubeLabel, PixelType};
use crate::error::{IsisError, IsisErrorExt};
use crate::image::{ImageBuffer, PixelBox};
use crate::pvl::{Pvl, label_prefix};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const LABEL_CHUNK: usize = 64 * 1024;
const MAX_LABEL_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
enum DataSource {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

/// Read-only access to the pixels of an ISIS cube (attached or detached label).
///
/// Columns are samples, rows are lines and planes are bands. Values come back scaled by
/// the label's `Base`/`Multiplier`, with ISIS special pixels mapped to NaN.
#[derive(Debug, Clone)]
pub struct DiskImageResourceIsis {
    pvl: Pvl,
    label: CubeLabel,
    source: DataSource,
}

impl DiskImageResourceIsis {
    /// Opens a cube file and parses its label. Pixel data is read lazily by [`Self::read`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the label is malformed, or the data
    /// section is shorter than the label declares.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IsisError> {
        let path = path.as_ref();
        let text = read_label(path)?;
        let pvl = Pvl::parse(&text).context(path.display().to_string())?;
        let label = CubeLabel::from_pvl(&pvl).context(path.display().to_string())?;

        let data_path = match &label.data_file {
            Some(file) => path.parent().map_or_else(|| file.clone(), |dir| dir.join(file)),
            None => path.to_path_buf(),
        };
        let available = std::fs::metadata(&data_path)
            .context(format!("Failed to stat {}", data_path.display()))?
            .len();
        check_length(&label, available).context(data_path.display().to_string())?;

        debug!(
            path = %path.display(),
            data = %data_path.display(),
            samples = label.samples,
            lines = label.lines,
            bands = label.bands,
            pixel_type = %label.pixel_type,
            "Opened ISIS cube"
        );

        Ok(Self { pvl, label, source: DataSource::File(data_path) })
    }

    /// Interprets an in-memory attached-label cube.
    ///
    /// # Errors
    /// Returns an error if the label is missing or malformed, if it points at a detached
    /// data file, or if the buffer is shorter than the label declares.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self, IsisError> {
        let bytes = bytes.into();
        let text = label_prefix(&bytes).ok_or_else(|| IsisError::missing("End"))?;
        let pvl = Pvl::parse(&text)?;
        let label = CubeLabel::from_pvl(&pvl)?;
        if label.data_file.is_some() {
            return Err(IsisError::unsupported("detached label without a file system path"));
        }
        check_length(&label, bytes.len() as u64)?;

        Ok(Self { pvl, label, source: DataSource::Memory(bytes) })
    }

    /// Number of samples per line.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.label.samples
    }

    /// Number of lines.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.label.lines
    }

    /// Number of bands.
    #[must_use]
    pub const fn planes(&self) -> usize {
        self.label.bands
    }

    #[must_use]
    pub const fn pixel_type(&self) -> PixelType {
        self.label.pixel_type
    }

    #[must_use]
    pub const fn label(&self) -> &CubeLabel {
        &self.label
    }

    /// The full parsed label, including groups the reader does not interpret.
    #[must_use]
    pub const fn pvl(&self) -> &Pvl {
        &self.pvl
    }

    #[must_use]
    pub fn valid_range(&self) -> (f64, f64) {
        self.label.valid_range()
    }

    /// Reads a window of every band.
    ///
    /// # Errors
    /// Returns [`IsisError::OutOfBounds`] if the window does not fit the cube, or an I/O
    /// error if the data cannot be read.
    pub fn read(&self, window: PixelBox) -> Result<ImageBuffer, IsisError> {
        if !window.fits_within(self.cols(), self.rows()) {
            return Err(IsisError::OutOfBounds {
                requested: window.to_string(),
                cols: self.cols(),
                rows: self.rows(),
            });
        }

        let mut data = Vec::with_capacity(window.width * window.height * self.planes());
        if window.is_empty() {
            return Ok(ImageBuffer { cols: window.width, rows: window.height, planes: self.planes(), data });
        }

        let mut reader = self.reader()?;
        let mut raw = Vec::new();
        for band in 0..self.planes() {
            for line in window.row..window.row + window.height {
                for (offset, _, count) in self.label.row_runs(band, line, window.col, window.width) {
                    raw.resize(count * self.label.pixel_type.size(), 0);
                    reader.read_at(offset, &mut raw)?;
                    self.label.decode(&raw, &mut data);
                }
            }
        }

        Ok(ImageBuffer { cols: window.width, rows: window.height, planes: self.planes(), data })
    }

    /// Reads the whole cube.
    ///
    /// # Errors
    /// See [`Self::read`].
    pub fn read_all(&self) -> Result<ImageBuffer, IsisError> {
        self.read(PixelBox::full(self.cols(), self.rows()))
    }

    fn reader(&self) -> Result<Reader<'_>, IsisError> {
        Ok(match &self.source {
            DataSource::File(path) => Reader::File(
                File::open(path).context(format!("Failed to open {}", path.display()))?,
            ),
            DataSource::Memory(bytes) => Reader::Memory(&bytes[..]),
        })
    }
}

enum Reader<'a> {
    File(File),
    Memory(&'a [u8]),
}

impl Reader<'_> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), IsisError> {
        match self {
            Self::File(file) => {
                file.seek(SeekFrom::Start(offset)).context("seek into cube data")?;
                file.read_exact(buf).context("read cube data")
            },
            Self::Memory(bytes) => {
                let start = usize::try_from(offset).map_err(|_| IsisError::unsupported("offset overflow"))?;
                let slice = bytes
                    .get(start..start + buf.len())
                    .ok_or_else(|| IsisError::unsupported("cube data ends early"))?;
                buf.copy_from_slice(slice);
                Ok(())
            },
        }
    }
}

fn check_length(label: &CubeLabel, available: u64) -> Result<(), IsisError> {
    let needed = label.data_end()?;
    if available < needed {
        return Err(IsisError::unsupported(format!(
            "truncated cube: label declares {needed} bytes, found {available}"
        )));
    }
    Ok(())
}

/// Reads label text from the start of `path`, stopping at the `End` line. A detached
/// label without a trailing `End` is taken whole.
fn read_label(path: &Path) -> Result<String, IsisError> {
    let context = || format!("Failed to read label {}", path.display());
    let mut file = File::open(path).context(context())?;

    let mut buffer = Vec::new();
    let mut chunk = vec![0_u8; LABEL_CHUNK];
    loop {
        let n = file.read(&mut chunk).context(context())?;
        if n == 0 {
            return Ok(String::from_utf8_lossy(&buffer).into_owned());
        }
        buffer.extend_from_slice(&chunk[..n]);
        let complete = buffer.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
        if let Some(text) = label_prefix(&buffer[..complete]) {
            return Ok(text.into_owned());
        }
        if buffer.len() > MAX_LABEL_BYTES {
            return Err(IsisError::missing("End")).context(context());
        }
    }
}
