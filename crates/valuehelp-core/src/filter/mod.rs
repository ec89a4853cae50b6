mod ast;
mod extract;


pub use ast::{FieldRef, Operator, RefSegment, Token, Where};
pub use extract::constant_in_where;
