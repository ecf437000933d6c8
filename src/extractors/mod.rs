//! HTML extraction modules
//!
//! Locators find candidate elements, transforms clean their text and
//! [`extract`] turns a [`FieldSpec`] into a typed [`ExtractedValue`].

mod field;
mod links;
mod locator;
mod transform;

pub use field::*;
pub use links::*;
pub use locator::*;
pub use transform::*;
