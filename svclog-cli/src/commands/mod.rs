pub mod collect;
pub mod dump;
pub mod exec;
