//! Runtime side of enum value help: filter decoding, constant extraction,
//! value-list resolution and the service read seam.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod filter;
pub mod resolve;
pub mod service;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        filter::{Token, Where, constant_in_where},
        resolve::{ReadRequest, ValueHelpRow, resolve},
        service::{AfterRead, Service, ServiceKind, register_handlers},
    };
}
