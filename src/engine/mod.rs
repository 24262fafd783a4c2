// 8.0: core insurance engine. coordinates market lifecycle, the seller order
// book, buyer-seller matching, and policy settlement against the frozen
// close-time price. deterministic and event-driven with no external I/O.

mod core;
mod matching;
mod orders;
mod results;
mod settlement;

pub use core::Engine;
pub use results::{EngineError, PolicyReceipt, Resolution};
