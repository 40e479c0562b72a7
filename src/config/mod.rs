mod settings;

pub use settings::{
    ApiConfig, LogConfig, LogFormat, PushConfig, ServerConfig, Settings, SseConfig, VapidConfig,
};
