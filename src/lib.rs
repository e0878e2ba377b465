pub mod assembler;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod hazard;
pub mod labels;
pub mod listing;
pub mod schedule;
pub mod source;

pub mod isa {
    pub mod mips; // MIPS-I integer subset
    pub mod regs;
}

pub use assembler::{AsmConfig, Assembler, Assembly};
pub use decoder::{Decoded, Decoder, MipsDecoder};
pub use error::{AsmError, LineError};
pub use isa::mips::Isa;
pub use schedule::{schedule, Packet, Program, Schedule, Slot};
