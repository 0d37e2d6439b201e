pub mod datastore;
pub mod generator;
pub mod search;
pub mod source;
pub mod speech;
pub mod storage;
