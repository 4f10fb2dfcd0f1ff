#[macro_use]
extern crate log;

#[macro_use]
extern crate serde;

#[macro_use]
extern crate garrison_result;

pub mod profiles;
pub mod sync;
