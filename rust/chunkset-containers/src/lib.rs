//! Containers for one 16-bit chunk of a compressed 32-bit integer set.
//!
//! A chunk is stored in one of three representations, chosen by density:
//! [`ArrayContainer`] (sorted values), [`BitmapContainer`] (one bit per value) and
//! [`RunContainer`] (maximal runs of consecutive values). [`Container`] is the
//! closed sum of the three and supports boolean algebra between any pair.

pub mod algebra;
pub mod array;
pub mod bitmap;
pub mod codec;
pub mod container;
pub mod policy;
pub mod run;
pub mod run_container;
pub mod run_store;
pub mod set_ops;
pub mod unsigned;

#[cfg(test)]
mod tests;

pub use array::ArrayContainer;
pub use bitmap::BitmapContainer;
pub use container::{Container, ContainerKind};
pub use policy::ContainerPolicy;
pub use run::Run;
pub use run_container::RunContainer;
pub use set_ops::SetOp;
