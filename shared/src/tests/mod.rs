mod mock_store_tests;
mod stager_tests;
