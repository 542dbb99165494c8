pub mod config_service;
pub mod in_memory_mood_repository;
pub mod in_memory_turn_repository;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::in_memory_mood_repository::InMemoryMoodRepository;
pub use crate::in_memory_turn_repository::InMemoryTurnRepository;
pub use crate::paths::SerenePaths;
