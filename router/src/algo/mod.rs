pub mod lshape;
