use bitflags::bitflags;

bitflags! {
    /// Options fixed for the lifetime of one parse pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ParseFlags: u8 {
        /// Skip the `.env` file-name check before reading.
        const NO_CHECK_EXT = 1 << 0;
        /// Disable `$VAR` / `${VAR}` expansion entirely.
        const NO_INTERPOLATE = 1 << 1;
    }
}

/// Quoting style of a raw value, derived from its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteKind {
    None,
    Single,
    Double,
    Backtick,
}

impl QuoteKind {
    pub(crate) fn of(first: char) -> Self {
        match first {
            '\'' => Self::Single,
            '"' => Self::Double,
            '`' => Self::Backtick,
            _ => Self::None,
        }
    }

    /// The quote character itself, if the value is quoted.
    pub(crate) fn quote(self) -> Option<char> {
        match self {
            Self::None => None,
            Self::Single => Some('\''),
            Self::Double => Some('"'),
            Self::Backtick => Some('`'),
        }
    }
}
