pub mod util;

pub use util::{parse_seeds, resolve_modes, split_csv};
