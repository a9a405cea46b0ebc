//! Neighbour search over atom positions.
//!
//! The scorer asks the same question thousands of times per request: which
//! atoms lie within the 8 Å interaction cutoff of this point? [`grid::SpatialIndex`]
//! answers it with a uniform grid of cubic cells. Queries visit only the cells
//! overlapping the bounding box of the query sphere and then apply an exact
//! distance test, so results never depend on the cell size.
//!
//! Positions are updated in place after each move, relocating an atom between
//! cells only when it crosses a cell boundary; the grid is built once per
//! conformation.

pub mod grid;
