mod document;
mod loader;

pub use self::{
    document::{NodeData, TreeData},
    loader::load,
};
