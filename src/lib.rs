pub mod analysis;
pub mod config;
pub mod consts;
pub mod error;
pub mod flow;
pub mod labels;
pub mod lens;
pub mod matrix;
pub mod records;
pub mod session;
// cmd and reports belong to the binary (main.rs).
