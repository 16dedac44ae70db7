mod array_tests;
mod bitmap_tests;
mod container_tests;
mod run_store_tests;
