//! In-memory doubles and helpers shared by the test suites of every crate.

pub mod auth_test_utils;
pub mod dynamo_test_utils;
pub mod http_test_utils;
pub mod mock_notifier;
pub mod mock_object_storage;
pub mod mock_profile_store;
pub mod mock_queue;
pub mod test_images;
pub mod test_logging;
