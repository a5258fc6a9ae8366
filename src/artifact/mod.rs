//! Per-domain probe transcripts.
//!
//! The probing stage keeps a plain-text log of every probed pair. Writes are
//! best effort: a transcript that cannot be created or appended to is
//! logged and the scan carries on without it.

mod transcript;

pub use transcript::{Transcript, TranscriptStore, TRANSCRIPT_SUFFIX};
