pub mod mock_store;
pub mod test_logging;
