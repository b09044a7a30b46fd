//! Display geometry, font selection and configuration builder

pub use crate::error::{BuilderError, MAX_COLS, MAX_ROWS};

/// Default per-row DDRAM base addresses
///
/// Two-line controllers lay rows out at 0x00 and 0x40; four-line glass
/// reuses the same controller by continuing row 0 and row 1 at 0x14 and
/// 0x54. 16-column four-line modules are commonly wired with
/// `[0x00, 0x40, 0x10, 0x50]` instead; override via
/// [`Geometry::with_row_offsets`].
pub const DEFAULT_ROW_OFFSETS: [u8; MAX_ROWS as usize] = [0x00, 0x40, 0x14, 0x54];

/// Character-cell geometry of the display
///
/// Maps logical (column, row) positions onto the controller's linear
/// DDRAM address space through a per-row base-offset table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// Number of character columns (1-40)
    pub cols: u8,
    /// Number of character rows (1-4)
    pub rows: u8,
    /// Per-row DDRAM base addresses
    ///
    /// Always four entries; rows beyond `rows` are never consulted.
    pub row_offsets: [u8; MAX_ROWS as usize],
}

impl Geometry {
    /// Create a geometry with the default row-offset table
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidGeometry` if either dimension is zero,
    /// `cols > MAX_COLS`, or `rows > MAX_ROWS`.
    pub fn new(cols: u8, rows: u8) -> Result<Self, BuilderError> {
        if cols == 0 || cols > MAX_COLS || rows == 0 || rows > MAX_ROWS {
            return Err(BuilderError::InvalidGeometry { cols, rows });
        }
        Ok(Self {
            cols,
            rows,
            row_offsets: DEFAULT_ROW_OFFSETS,
        })
    }

    /// Replace the row-offset table
    ///
    /// For controller/glass combinations wired differently from the
    /// default map.
    #[must_use]
    pub fn with_row_offsets(mut self, row_offsets: [u8; MAX_ROWS as usize]) -> Self {
        self.row_offsets = row_offsets;
        self
    }

    /// DDRAM address of a character cell
    ///
    /// Callers pass normalized coordinates; a row beyond the table falls
    /// back to row 0 rather than reading out of bounds.
    pub fn ddram_address(&self, col: u8, row: u8) -> u8 {
        let offset = self
            .row_offsets
            .get(usize::from(row))
            .copied()
            .unwrap_or(self.row_offsets[0]);
        col.wrapping_add(offset)
    }
}

/// Character font height
///
/// The 5x10 font exists only on one-line glass; the driver ignores the
/// selection on multi-row geometries the way the controller does.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Font {
    /// 5x8 dot characters (all modules)
    #[default]
    FiveByEight,
    /// 5x10 dot characters (one-line modules only)
    FiveByTen,
}

/// Display configuration
///
/// Fixed for the lifetime of a display instance. Use [`Builder`] to
/// create one.
#[derive(Clone, Debug)]
pub struct Config {
    /// Character-cell geometry
    pub geometry: Geometry,
    /// Font height
    pub font: Font,
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use charlcd::{Builder, Geometry};
///
/// let geometry = match Geometry::new(16, 2) {
///     Ok(geometry) => geometry,
///     Err(_) => return,
/// };
/// let config = match Builder::new().geometry(geometry).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    /// Character-cell geometry (required)
    geometry: Option<Geometry>,
    /// Font height
    font: Font,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display geometry (required)
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the font height
    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingGeometry` if the geometry was not set.
    pub fn build(self) -> Result<Config, BuilderError> {
        Ok(Config {
            geometry: self.geometry.ok_or(BuilderError::MissingGeometry)?,
            font: self.font,
        })
    }
}
