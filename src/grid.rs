use serde::{Deserialize, Serialize};

/// Value of an unpainted (white) cell.
pub const EMPTY: u8 = 0;
/// Value of a painted (black) cell.
pub const PAINTED: u8 = 1;

/// Integer coordinate of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A binary raster drawing.
///
/// Serializes as a plain row-major 2D array (`[[0,1,..],..]`), which is also
/// the text export format. Deserialization rejects ragged or non-binary data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<u8>>", try_from = "Vec<Vec<u8>>")]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

/// Errors raised when building a grid from untrusted rows.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({x}, {y}) holds {value}, expected 0 or 1")]
    NonBinaryCell { x: usize, y: usize, value: u8 },
}

impl Grid {
    /// Creates an all-white grid. Zero dimensions are bumped to 1.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![EMPTY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    pub fn is_painted(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(PAINTED)
    }

    /// Paints a cell black. Returns true only if the cell was white before.
    pub fn paint(&mut self, x: usize, y: usize) -> bool {
        match self.index(x, y) {
            Some(idx) if self.cells[idx] == EMPTY => {
                self.cells[idx] = PAINTED;
                true
            }
            _ => false,
        }
    }

    /// Resets every cell to white.
    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    pub fn painted_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == PAINTED).count()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&c| c == EMPTY)
    }

    /// Iterates the coordinates of every painted cell in row-major order.
    pub fn painted_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == PAINTED)
            .map(|(idx, _)| CellCoord::new(idx % self.width, idx / self.width))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.width)
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.rows().map(<[u8]>::to_vec).collect()
    }

    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            if let Some((x, &value)) = row.iter().enumerate().find(|(_, v)| **v > PAINTED) {
                return Err(GridError::NonBinaryCell { x, y, value });
            }
            cells.extend(row);
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }
}

impl From<Grid> for Vec<Vec<u8>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}
