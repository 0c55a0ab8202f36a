pub mod download;

pub mod util;
