pub mod domain;
pub mod paths;
pub mod protocol;
