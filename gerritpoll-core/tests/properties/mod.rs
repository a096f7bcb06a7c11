mod query_tests;
mod watermark_tests;
