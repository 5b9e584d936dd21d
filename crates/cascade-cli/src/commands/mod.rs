pub mod compare;
pub mod run;
pub mod stats;
pub mod util;
