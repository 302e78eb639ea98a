//! Domain repositories
//!
//! Typed façades the application reads and writes through. Reads
//! resolve immediately from local state (read-through, with a remote
//! hydrate only for the profile); writes persist locally and enqueue
//! the matching mutation in the same call, so local success and
//! queueing are atomic from the caller's point of view.
//!
//! Repository methods return `bool`/`Option` instead of errors: a
//! degraded store or a doomed future sync never crashes the caller.
//! User-facing error messaging is the caller's concern.

mod activity;
mod family;
mod kindness;
mod profile;
mod progress;
mod storybook;

pub use activity::ActivityRepository;
pub use family::FamilyRepository;
pub use kindness::KindnessRepository;
pub use profile::ProfileRepository;
pub use progress::ProgressRepository;
pub use storybook::StorybookRepository;
