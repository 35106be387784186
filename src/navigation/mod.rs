//! Hierarchical pathfinding over large grids combined with flow fields for
//! crowds of actors.
//!
//! [Near Optimal Hierarchical Path-Finding (HPA*)](https://webdocs.cs.ualberta.ca/~mmueller/ps/hpastar.pdf)
//!
//! [SupCom2- Elijah Emerson](https://www.gameaipro.com/GameAIPro/GameAIPro_Chapter23_Crowd_Pathfinding_and_Steering_Using_Flow_Field_Tiles.pdf)
//!
//! [Fast Marching Methods](https://math.berkeley.edu/~sethian/2006/Explanations/fast_marching_explain.html)
//!
//! A level is divided into a series of Sectors. Every Sector is labeled into
//! connected regions, and Portals mark the pathable windows from a region of
//! one Sector into a neighbour. Long range searches only walk the graph of
//! Portals while the movement within a Sector is handed to a flow field.
//!
//! ```text
//!  ___________________ ___________________
//! |                   |                   |
//! |    region 1       P    region 1       |
//! |___________        P                   |
//! |xxxxxxxxxxx|       |                   |
//! |    region 2       |___PPPPP___________|
//! |___________________|                   |
//! ```
//!
//! Definitions:
//!
//! * Level - the ground truth of obstacles, terrain ids and cost stamps for
//!   every cell, plus a terrain cost table per travel type
//! * Sector - a rectangular block of the level, sectors along the eastern and
//!   southern edges may be truncated
//! * Cost field - 8-bit field where `255` is impassable and `1..=254` is the
//!   cost of crossing a cell
//! * Color field - connected region label of every cell of a sector
//! * Portal - a run of cells along a sector side that is open on both sides
//! * Integration field - cumulative cost of reaching a goal, solved as an
//!   Eikonal equation
//! * Flow field - per-cell directions derived from the integration field
//!

pub mod cache;
pub mod error;
pub mod fields;
pub mod level;
pub mod navigation_level;
pub mod navigator;
pub mod portal;
pub mod sectors;
pub mod settings;
pub mod utilities;
