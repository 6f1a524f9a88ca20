pub mod yomitan;

pub use yomitan::{Manifest, YomitanArchive};
