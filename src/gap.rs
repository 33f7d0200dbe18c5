//! Generic Access Profile ([Vol 3] Part C) and beacon advertising.

pub use {beacon::*, consts::*, response_data::*, uuid::*};

mod beacon;
mod consts;
mod response_data;
mod uuid;
