pub mod recording;

pub use recording::{Recording, RecordingPage, APPROVED_STATUS};
