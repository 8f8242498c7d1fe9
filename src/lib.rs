pub mod geom;
pub mod io;
pub mod sim;
pub mod vecutils;

// Prelude
pub use geom::point::Point;
pub use geom::vector::Vector;
pub use sim::lightpath::{
    DetectorGeometry, LightPathCalculator, LightPathResult, PathError, PathRequest, PathType,
    SolverConfig,
};
pub use sim::materials::{RefractiveIndexTable, Region};
