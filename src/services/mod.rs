pub mod load_service;
pub mod pipeline_service;
pub mod run_log_service;
pub mod scheduler_service;
pub mod schema_service;
pub mod transform_service;
pub mod user_api_service;
