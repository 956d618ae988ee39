/// Default reply line limit.
pub const DEFAULT_MAX_LINE_LEN: usize = 256;

/// Configuration for [`crate::Lcvr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcvrConfig {
    /// Longest reply line accepted, in bytes. Default: 256.
    pub max_line_len: usize,
    /// Discard stale input before each command. Default: `true`.
    pub flush_before_command: bool,
}

impl Default for LcvrConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            flush_before_command: true,
        }
    }
}
