pub mod composer;

pub use composer::{OrderComposer, RequestedItem};
