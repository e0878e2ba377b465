pub mod model;
pub mod report;

// Re-export commonly used types/functions for consumers
pub use model::{assemble_file, load_listing};
pub use report::{build_report, verify, PacketOut, Report, SlotOut};
