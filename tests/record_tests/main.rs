//! Tests for records and their encodings

mod codec_tests;
mod document_tests;
