pub mod output_tests;
pub mod record_tests;
