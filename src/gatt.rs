//! Generic Attribute Profile tables ([Vol 3] Part G) and write callback
//! dispatch.

pub use {callback::*, chars::*, consts::*, service::*};

mod callback;
mod chars;
mod consts;
mod service;
