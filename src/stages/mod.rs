pub mod enhance;
pub mod stage0_filename;
pub mod stage1_extract;
pub mod stage2_assemble;
pub mod stage3_reconcile;

pub use enhance::*;
pub use stage0_filename::*;
pub use stage1_extract::{extract_with_oracle, ExtractionStrategy, OracleExtractionConfig};
pub use stage2_assemble::*;
pub use stage3_reconcile::*;
