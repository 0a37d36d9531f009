pub mod engine;

pub use engine::{BasketAverages, OrderTotal, PricePoint, ReportEngine, RepurchaseRate};
