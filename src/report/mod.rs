//! Reporting: equations, slider summaries, and formatted terminal output.

pub mod axis;
pub mod equation;
pub mod format;

pub use axis::*;
pub use equation::*;
pub use format::*;
