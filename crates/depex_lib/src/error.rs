use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepexError {
    #[error("unexpected end of input at offset {0}")]
    Eof(usize),

    #[error("invalid magic number: 0x{0:08x}")]
    BadMagic(u32),

    #[error("invalid string index: {index} (table has {len} entries)")]
    InvalidStringIndex { index: u16, len: usize },

    #[error("invalid operand type tag: {0}")]
    InvalidOperandTag(u8),

    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    #[error("variadic operand count for {opcode} must be a non-negative integer")]
    InvalidVarArgCount { opcode: &'static str },

    #[error("invalid boolean byte {value} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },

    #[error("{0} trailing bytes after the last script object")]
    TrailingData(usize),

    #[error("invalid UTF-8 in string at offset {0}")]
    InvalidUtf8(usize),

    #[error("string too long to encode ({0} bytes)")]
    StringTooLong(usize),

    #[error("too many entries in {what}: {count}")]
    TooManyEntries { what: &'static str, count: usize },

    #[error("display-only operand cannot be serialized: {0}")]
    DisplayOnlyOperand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisassemblyFailure {
    #[error("conditional does not close an IF or WHILE")]
    UnresolvedConditional,

    #[error("malformed condition chain")]
    MalformedCondition,

    #[error("unexpected jump")]
    StrayJump,

    #[error("nesting too deep")]
    TooDeep,
}

/// Structural recovery stopped at `ptr_delta`; `partial` holds the lines
/// emitted before that point.
#[derive(Debug, Clone, Error)]
#[error("{reason} at instruction {ptr_delta}")]
pub struct DisassemblyError {
    pub partial: Vec<String>,
    pub ptr_delta: usize,
    pub reason: DisassemblyFailure,
}

impl DisassemblyError {
    pub(crate) fn new(ptr_delta: usize, reason: DisassemblyFailure) -> Self {
        Self { partial: Vec::new(), ptr_delta, reason }
    }

    pub(crate) fn shifted(mut self, mut prefix: Vec<String>, offset: usize) -> Self {
        prefix.append(&mut self.partial);
        self.partial = prefix;
        self.ptr_delta += offset;
        self
    }
}
