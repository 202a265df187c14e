pub mod image_decode;
pub mod recognizer;
