mod rfft;

pub use rfft::*;
