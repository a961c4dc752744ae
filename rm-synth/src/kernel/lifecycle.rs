use super::ConfigError;

/// Constructor validation lifecycle shared by transform kernels.
///
/// Every kernel validates its configuration exactly once, at construction;
/// a constructed kernel is immutable and safe to reuse across lines of sight.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}
