/*!
 * Persistence of job progress between runs.
 *
 * A translation job records the index of the next paragraph to process so an
 * interrupted job resumes instead of starting over.
 */

pub mod checkpoint;

pub use checkpoint::{CHECKPOINT_SUFFIX, CheckpointStore};
