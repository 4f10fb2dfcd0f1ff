mod restrictions;

pub use restrictions::*;
