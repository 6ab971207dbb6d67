pub mod analysis;
pub mod consts;
pub mod division;
pub mod error;
pub mod filters;
pub mod flow;
pub mod frame;
pub mod io;
pub mod jobs;
pub mod mask;
pub mod pipeline;
pub mod render;
pub mod temporal;
