/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u16;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

/// Two-dimensional coordinates `(x, y)`, zero-based, `x` is the column.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (x, y) = coords;
    let (dx, dy) = delta;
    let (max_x, max_y) = bounds;

    let next_x = x.checked_add_signed(dx.try_into().ok()?)?;
    if next_x >= max_x {
        return None;
    }

    let next_y = y.checked_add_signed(dy.try_into().ok()?)?;
    if next_y >= max_y {
        return None;
    }

    Some((next_x, next_y))
}

/// Iterator over the in-bounds cells at Chebyshev distance 1 from `center`.
///
/// Yields at most 8 coordinates; edge and corner cells get fewer. The grid
/// does not wrap around.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

/// Row-major iterator over every coordinate of a `bounds`-sized grid.
///
/// Rows (`y`) are the outer loop, so `(0,0), (1,0), .., (0,1), ..` for any
/// board shape. Restartable by constructing it again; the order is fixed so
/// tests can rely on it.
#[derive(Debug)]
pub struct CoordIter {
    bounds: Coord2,
    next: Option<Coord2>,
}

impl CoordIter {
    pub(crate) fn new(bounds: Coord2) -> Self {
        let next = if bounds.0 > 0 && bounds.1 > 0 {
            Some((0, 0))
        } else {
            None
        };
        Self { bounds, next }
    }
}

impl Iterator for CoordIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let (x, y) = current;
        self.next = if x + 1 < self.bounds.0 {
            Some((x + 1, y))
        } else if y + 1 < self.bounds.1 {
            Some((0, y + 1))
        } else {
            None
        };
        Some(current)
    }
}
