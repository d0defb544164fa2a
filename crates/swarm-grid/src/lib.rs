//! `swarm-grid` — the arena occupancy grid.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`cell`]   | `CellState`, `Cell`                                           |
//! | [`grid`]   | `ArenaGrid` (row-major cells, extent marking/clearing/verify) |
//! | [`view`]   | `GridView` (rectangular sub-region)                           |
//! | [`error`]  | `GridError`, `GridResult<T>`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |
//!
//! Every state transition is one call on one cell.  Illegal transitions and
//! cell/entity disagreements are invariant violations and panic.

pub mod cell;
pub mod error;
pub mod grid;
pub mod view;

#[cfg(test)]
mod tests;

pub use cell::{Cell, CellState};
pub use error::{GridError, GridResult};
pub use grid::ArenaGrid;
pub use view::GridView;
