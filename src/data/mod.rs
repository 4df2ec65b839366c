//! Graph input and interchange formats

pub mod edgelist;
