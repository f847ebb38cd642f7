/// Audit Configuration
///
/// One `AuditConfig` describes a whole run: which function emits the
/// diagnostics we are hunting for, and which of its argument operands carry
/// the numeric code and the message text. The value is threaded explicitly
/// into the matcher and extractor so that several independent audits (for
/// example, different target symbols) can coexist in one process.

/// Mangled name of Blink's GL error synthesizer, the default audit target.
pub const DEFAULT_TARGET_SYMBOL: &str = "_ZN5blink25WebGLRenderingContextBase17\
SynthesizeGLErrorEjPKcS2_NS0_24ConsoleDisplayPreferenceE";

/// Configuration for one audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Linker symbol of the diagnostic-emitting function to search for.
    pub target_symbol: String,
    /// Argument position of the numeric diagnostic code.
    pub code_arg: usize,
    /// Argument position of the message operand (a string literal, possibly
    /// behind one level of addressing).
    pub message_arg: usize,
}

impl AuditConfig {
    pub fn new(target_symbol: impl Into<String>, code_arg: usize, message_arg: usize) -> Self {
        Self {
            target_symbol: target_symbol.into(),
            code_arg,
            message_arg,
        }
    }
}

impl Default for AuditConfig {
    /// Defaults match `SynthesizeGLError(this, code, function_name,
    /// description, ..)`: operand 0 is the receiver, the code sits at 1 and
    /// the human-readable description at 3.
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_SYMBOL, 1, 3)
    }
}
