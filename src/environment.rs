//! The runtime environment.
//!
//! The environment is a process-wide singleton that must be initialized before the default allocator can be used.
//! It owns the default [`CpuAllocator`] and the logging settings of the crate. It is initialized once, by the first
//! call to [`Environment::init`] or [`Environment::init_with_config`], and lives until the process exits.
//!
//! Log messages are emitted as [`tracing`] events with the target `ortvalue`, filtered by the environment's
//! [`LoggingLevel`]. Installing a subscriber is left to the application.

use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::OnceCell;

use crate::log::{info, warning};
use crate::memory::{AllocatorType, CpuAllocator, MemoryAllocator};
use crate::{Error, Result};

static ENVIRONMENT: OnceCell<Environment> = OnceCell::new();

const DEFAULT_LOG_ID: &str = "ortvalue";

/// The severity of log messages.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoggingLevel {
    /// Detailed tracing of value lifetimes.
    Verbose = 0,
    /// Informational messages.
    Info = 1,
    /// Warnings.
    Warning = 2,
    /// Errors.
    Error = 3,
    /// Errors after which the runtime can not continue.
    Fatal = 4,
}
impl LoggingLevel {
    fn from_u8(level: u8) -> Self {
        match level {
            0 => LoggingLevel::Verbose,
            1 => LoggingLevel::Info,
            2 => LoggingLevel::Warning,
            3 => LoggingLevel::Error,
            _ => LoggingLevel::Fatal,
        }
    }
}

/// Settings of the runtime environment.
///
/// ```
/// use ortvalue::environment::{EnvironmentConfig, LoggingLevel};
///
/// let config = EnvironmentConfig::new()
///     .with_log_id("my-app")
///     .with_logging_level(LoggingLevel::Info);
/// assert_eq!(config.log_id(), "my-app");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    log_id: String,
    logging_level: LoggingLevel,
    default_allocator_type: AllocatorType,
}
impl EnvironmentConfig {
    /// Create a config with the default settings.
    ///
    /// The log id is `ortvalue`, the logging level is [`LoggingLevel::Warning`] and the default allocator reports
    /// [`AllocatorType::DeviceAllocator`].
    pub fn new() -> Self {
        Self {
            log_id: DEFAULT_LOG_ID.to_string(),
            logging_level: LoggingLevel::Warning,
            default_allocator_type: AllocatorType::DeviceAllocator,
        }
    }

    /// Set the id attached to every log message.
    pub fn with_log_id(mut self, log_id: impl Into<String>) -> Self {
        self.log_id = log_id.into();
        self
    }

    /// Set the minimal severity of emitted log messages.
    pub fn with_logging_level(mut self, level: LoggingLevel) -> Self {
        self.logging_level = level;
        self
    }

    /// Set the allocator type reported by the default allocator.
    pub fn with_default_allocator_type(mut self, allocator_type: AllocatorType) -> Self {
        self.default_allocator_type = allocator_type;
        self
    }

    /// The id attached to every log message.
    pub fn log_id(&self) -> &str {
        &self.log_id
    }

    /// The minimal severity of emitted log messages.
    pub fn logging_level(&self) -> LoggingLevel {
        self.logging_level
    }

    /// The allocator type reported by the default allocator.
    pub fn default_allocator_type(&self) -> AllocatorType {
        self.default_allocator_type
    }
}
impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide runtime environment.
#[derive(Debug)]
pub struct Environment {
    log_id: String,
    logging_level: AtomicU8,
    default_allocator: CpuAllocator,
}
impl Environment {
    /// Initialize the environment with the default config, or get it if it is already initialized.
    pub fn init() -> &'static Environment {
        Self::init_with_config(EnvironmentConfig::default())
    }

    /// Initialize the environment with the given config, or get it if it is already initialized.
    ///
    /// Only the first initialization takes effect. If the environment already exists with a different log id or
    /// default allocator type, the given config is ignored and a warning is logged.
    pub fn init_with_config(config: EnvironmentConfig) -> &'static Environment {
        let mut created = false;
        let env = ENVIRONMENT.get_or_init(|| {
            created = true;
            Environment {
                log_id: config.log_id.clone(),
                logging_level: AtomicU8::new(config.logging_level as u8),
                default_allocator: CpuAllocator::new(config.default_allocator_type),
            }
        });
        if created {
            info!(
                "runtime environment initialized, logging level {:?}",
                config.logging_level
            );
        } else if env.log_id != config.log_id
            || env.default_allocator.memory_info().allocator_type()
                != config.default_allocator_type
        {
            warning!("runtime environment is already initialized, ignoring the given config");
        }
        env
    }

    /// Get the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UninitializedEnvironment`] if the environment was not initialized yet.
    pub fn get() -> Result<&'static Environment> {
        ENVIRONMENT.get().ok_or(Error::UninitializedEnvironment)
    }

    /// Returns true if the environment was initialized.
    pub fn is_initialized() -> bool {
        ENVIRONMENT.get().is_some()
    }

    /// The id attached to every log message.
    pub fn log_id(&self) -> &str {
        &self.log_id
    }

    /// The minimal severity of emitted log messages.
    pub fn logging_level(&self) -> LoggingLevel {
        LoggingLevel::from_u8(self.logging_level.load(Ordering::Relaxed))
    }

    /// Change the minimal severity of emitted log messages.
    pub fn set_logging_level(&self, level: LoggingLevel) {
        self.logging_level.store(level as u8, Ordering::Relaxed);
    }

    /// The default allocator, see [`CpuAllocator::default_instance`].
    pub fn default_allocator(&self) -> &CpuAllocator {
        &self.default_allocator
    }
}

pub(crate) fn logging_enabled(level: LoggingLevel) -> bool {
    let min_level = ENVIRONMENT
        .get()
        .map_or(LoggingLevel::Warning, |env| env.logging_level());
    level >= min_level
}

pub(crate) fn current_log_id() -> &'static str {
    ENVIRONMENT
        .get()
        .map_or(DEFAULT_LOG_ID, |env| env.log_id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::init_environment;

    #[test]
    fn init_is_idempotent() {
        let env = init_environment();
        assert!(Environment::is_initialized());
        let again = Environment::init_with_config(
            EnvironmentConfig::new().with_log_id("another-id"),
        );
        assert!(std::ptr::eq(env, again));
        assert_eq!(again.log_id(), env.log_id());
        assert!(std::ptr::eq(Environment::get().unwrap(), env));
    }

    #[test]
    fn default_allocator_belongs_to_environment() {
        let env = init_environment();
        let allocator = CpuAllocator::default_instance().unwrap();
        assert!(std::ptr::eq(env.default_allocator(), allocator));
    }

    #[test]
    fn config_builder() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.log_id(), "ortvalue");
        assert_eq!(config.logging_level(), LoggingLevel::Warning);
        assert_eq!(
            config.default_allocator_type(),
            AllocatorType::DeviceAllocator
        );

        let config = config
            .with_log_id("test")
            .with_logging_level(LoggingLevel::Verbose)
            .with_default_allocator_type(AllocatorType::ArenaAllocator);
        assert_eq!(config.log_id(), "test");
        assert_eq!(config.logging_level(), LoggingLevel::Verbose);
        assert_eq!(config.default_allocator_type(), AllocatorType::ArenaAllocator);
    }

    #[test]
    fn logging_levels() {
        for level in [
            LoggingLevel::Verbose,
            LoggingLevel::Info,
            LoggingLevel::Warning,
            LoggingLevel::Error,
            LoggingLevel::Fatal,
        ] {
            assert_eq!(LoggingLevel::from_u8(level as u8), level);
        }
        assert!(LoggingLevel::Verbose < LoggingLevel::Warning);
        assert!(LoggingLevel::Fatal > LoggingLevel::Error);
    }
}
