pub mod lightpath;
pub mod materials;
