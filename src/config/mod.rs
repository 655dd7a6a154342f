mod settings;

pub use settings::{
    Config, LogConfig, ServerConfig, SessionConfig, TaskListConfig, EXAMPLE_CONFIG,
    MAX_SESSION_TTL_HOURS,
};
