// Transmission input formats
pub mod transmission;

pub use transmission::{load_transmission, read_transmission_text, TransmissionError};
