//! Reading and writing band images and point tables

mod geotiff;
mod points;

pub use geotiff::{
    read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer,
};
pub use points::{is_na, read_point_table, read_point_table_path, PointTable};
