pub mod synthesis;
pub mod voice;
