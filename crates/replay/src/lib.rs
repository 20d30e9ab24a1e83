#![forbid(unsafe_code)]

mod replayer;

pub use replayer::{Outcome, ReplayOptions, ReplayReport, Replayer, replay_file};
