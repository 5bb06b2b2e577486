pub mod assets;
pub mod util;

pub use assets::load_catalog;
pub use util::{parse_seeds, split_csv};
