pub mod heuristics;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod reformat;
pub mod stages;

pub use heuristics::{extract_heuristic_fields, Enhancements};
pub use io::{
    load_existing, DirectoryDocumentSource, DocumentRef, DocumentSource, EpisodeStore,
    JsonFileStore, StoreError,
};
pub use llm::{AnthropicClient, AnthropicConfig, Oracle, OracleError, OracleRequest};
pub use models::{Episode, EpisodeFieldUpdate, ExtractedFields, NotableQuote, WorkExperience};
pub use pipeline::{
    collection_stats, run_enhance, run_extraction, run_reformat, CollectionStats,
    ExtractionReport, ReformatOptions, ReformatReport,
};
pub use reformat::{needs_reformat, normalize_transcript, reformat_transcript};
pub use stages::{
    assemble_episode, parse_filename, reconcile, ExtractionStrategy, FilenameInfo,
    OracleExtractionConfig, ReconcileResult,
};
