//! Infrastructure layer: subprocess implementations behind I/O traits

pub mod traits;

pub use traits::{CommandRunner, PickerSelector, RealCommandRunner, SelectionItem, Selector};
