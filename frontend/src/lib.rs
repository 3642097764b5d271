pub mod arbiter;
pub mod console;
pub mod line_stream;
pub mod protocol;
