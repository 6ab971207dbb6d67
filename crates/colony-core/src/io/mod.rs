pub mod dataset;
pub mod image_io;
pub mod ser;
pub mod ser_writer;

pub use dataset::{load_image_directory, load_sequence, load_ser_sequence, FrameSequence};
