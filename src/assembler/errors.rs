//! Diagnostic kinds shared by every stage of the pipeline.
//!
//! Each error and warning carries a stable short name (printed inside the
//! `[...]` brackets) and a human message. Diagnostics never abort the
//! process; the driver records them, keeps going, and withholds the output
//! files if any error was seen.

use std::fmt;

/// Every error the assembler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // File handling and setup
    MissingAsFile,
    FilenameTooLong,
    FileNotExist,
    FileRead,
    FileWrite,
    FileDelete,
    ObjectFileCreate,
    EntryFileCreate,
    ExternalFileCreate,
    LineTooLong,
    MemoryAllocation,
    AssemblyFailed,
    VpcStorageFull,

    // Macro preprocessing
    McroNoName,
    McroDuplicate,
    McroBeforeDef,
    McroTooLong,
    McroIsRegister,
    McroIllegalChar,
    McroIllegalStart,
    McroReservedName,
    McroIllegalName,
    McroUnexpectedText,
    MacroCallExtraText,

    // Labels
    LabelTooLong,
    IllegalLabelStart,
    IllegalLabelChar,
    LabelIsReservedWord,
    LabelIsRegister,
    LabelDuplicate,
    LabelIsMcroName,
    LabelAlreadyExtern,
    ExternLabelConflict,
    UndefinedLabel,
    UndefinedLabelRelative,
    UndefinedEntryLabel,
    LabelNotDefinedInFile,
    LabelUsedInSameLine,
    RelativeAddressingExternalLabel,
    RelativeAddressingToData,
    DuplicateEntryLabel,
    InvalidLabelContent,

    // Directives
    EntryMissingLabel,
    ExternMissingLabel,
    EntryExtraText,
    ExternExtraText,
    MaybeMeantEntry,
    MaybeMeantExtern,
    NotExternLine,
    NotEntryLine,
    EntryInsteadOfExtern,

    // Instructions
    UnknownCommand,
    InvalidParamCount,
    MissingComma,
    ConsecutiveCommas,
    ExtraTextAfterCommand,
    InvalidDirectOrRegisterOperand,
    InvalidImmediateDirectOrRegisterFirstOperand,
    InvalidImmediateDirectOrRegisterSecondOperand,
    InvalidDirectOrRegisterSecondOperand,
    InvalidDirectFirstOperand,
    InvalidRelativeOrDirectOperand,
    InvalidImmediateOperand,
    InvalidImmediateDirectOrRegisterOperand,

    // .data / .string
    InvalidDataNoNumber,
    InvalidDataNonNumeric,
    InvalidDataRealNumber,
    InvalidDataTooLarge,
    InvalidDataMissingComma,
    InvalidDataTrailingComma,
    InvalidDataUnexpectedChar,
    InvalidStringNoQuote,
    InvalidStringMissingEndQuote,
    InvalidStringExtraChars,
    StringNoValue,
    InvalidStorageDirective,
}

/// Conditions worth reporting that do not invalidate the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    LabelBeforeExtern,
    LabelBeforeEntry,
    RedundantEntry,
    LabelResemblesInvalidRegister,
}

impl ErrorKind {
    /// Stable identifier printed inside the brackets of a diagnostic.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::MissingAsFile => "MISSING_AS_FILE",
            ErrorKind::FilenameTooLong => "FILENAME_TOO_LONG",
            ErrorKind::FileNotExist => "FILE_NOT_EXIST",
            ErrorKind::FileRead => "FILE_READ",
            ErrorKind::FileWrite => "FILE_WRITE",
            ErrorKind::FileDelete => "FILE_DELETE",
            ErrorKind::ObjectFileCreate => "OBJECT_FILE_CREATE",
            ErrorKind::EntryFileCreate => "ENTRY_FILE_CREATE",
            ErrorKind::ExternalFileCreate => "EXTERNAL_FILE_CREATE",
            ErrorKind::LineTooLong => "LINE_TOO_LONG",
            ErrorKind::MemoryAllocation => "MEMORY_ALLOCATION",
            ErrorKind::AssemblyFailed => "ASSEMBLY_FAILED",
            ErrorKind::VpcStorageFull => "VPC_STORAGE_FULL",
            ErrorKind::McroNoName => "MCRO_NO_NAME",
            ErrorKind::McroDuplicate => "MCRO_DUPLICATE",
            ErrorKind::McroBeforeDef => "MCRO_BEFORE_DEF",
            ErrorKind::McroTooLong => "MCRO_TOO_LONG",
            ErrorKind::McroIsRegister => "MCRO_IS_REGISTER",
            ErrorKind::McroIllegalChar => "MCRO_ILLEGAL_CHAR",
            ErrorKind::McroIllegalStart => "MCRO_ILLEGAL_START",
            ErrorKind::McroReservedName => "MCRO_RESERVED_NAME",
            ErrorKind::McroIllegalName => "MCRO_ILLEGAL_NAME",
            ErrorKind::McroUnexpectedText => "MCRO_UNEXPECTED_TEXT",
            ErrorKind::MacroCallExtraText => "MACRO_CALL_EXTRA_TEXT",
            ErrorKind::LabelTooLong => "LABEL_TOO_LONG",
            ErrorKind::IllegalLabelStart => "ILLEGAL_LABEL_START",
            ErrorKind::IllegalLabelChar => "ILLEGAL_LABEL_CHAR",
            ErrorKind::LabelIsReservedWord => "LABEL_IS_RESERVED_WORD",
            ErrorKind::LabelIsRegister => "LABEL_IS_REGISTER",
            ErrorKind::LabelDuplicate => "LABEL_DUPLICATE",
            ErrorKind::LabelIsMcroName => "LABEL_IS_MCRO_NAME",
            ErrorKind::LabelAlreadyExtern => "LABEL_ALREADY_EXTERN",
            ErrorKind::ExternLabelConflict => "EXTERN_LABEL_CONFLICT",
            ErrorKind::UndefinedLabel => "UNDEFINED_LABEL",
            ErrorKind::UndefinedLabelRelative => "UNDEFINED_LABEL_RELATIVE",
            ErrorKind::UndefinedEntryLabel => "UNDEFINED_ENTRY_LABEL",
            ErrorKind::LabelNotDefinedInFile => "LABEL_NOT_DEFINED_IN_FILE",
            ErrorKind::LabelUsedInSameLine => "LABEL_USED_IN_SAME_LINE",
            ErrorKind::RelativeAddressingExternalLabel => "RELATIVE_ADDRESSING_EXTERNAL_LABEL",
            ErrorKind::RelativeAddressingToData => "RELATIVE_ADDRESSING_TO_DATA",
            ErrorKind::DuplicateEntryLabel => "DUPLICATE_ENTRY_LABEL",
            ErrorKind::InvalidLabelContent => "INVALID_LABEL_CONTENT",
            ErrorKind::EntryMissingLabel => "ENTRY_MISSING_LABEL",
            ErrorKind::ExternMissingLabel => "EXTERN_MISSING_LABEL",
            ErrorKind::EntryExtraText => "ENTRY_EXTRA_TEXT",
            ErrorKind::ExternExtraText => "EXTERN_EXTRA_TEXT",
            ErrorKind::MaybeMeantEntry => "MAYBE_MEANT_ENTRY",
            ErrorKind::MaybeMeantExtern => "MAYBE_MEANT_EXTERN",
            ErrorKind::NotExternLine => "NOT_EXTERN_LINE",
            ErrorKind::NotEntryLine => "NOT_ENTRY_LINE",
            ErrorKind::EntryInsteadOfExtern => "ENTRY_INSTEAD_OF_EXTERN",
            ErrorKind::UnknownCommand => "UNKNOWN_COMMAND",
            ErrorKind::InvalidParamCount => "INVALID_PARAM_COUNT",
            ErrorKind::MissingComma => "MISSING_COMMA",
            ErrorKind::ConsecutiveCommas => "CONSECUTIVE_COMMAS",
            ErrorKind::ExtraTextAfterCommand => "EXTRA_TEXT_AFTER_COMMAND",
            ErrorKind::InvalidDirectOrRegisterOperand => "INVALID_DIRECT_OR_REGISTER_OPERAND",
            ErrorKind::InvalidImmediateDirectOrRegisterFirstOperand => {
                "INVALID_IMMEDIATE_DIRECT_OR_REGISTER_FIRST_OPERAND"
            }
            ErrorKind::InvalidImmediateDirectOrRegisterSecondOperand => {
                "INVALID_IMMEDIATE_DIRECT_OR_REGISTER_SECOND_OPERAND"
            }
            ErrorKind::InvalidDirectOrRegisterSecondOperand => {
                "INVALID_DIRECT_OR_REGISTER_SECOND_OPERAND"
            }
            ErrorKind::InvalidDirectFirstOperand => "INVALID_DIRECT_FIRST_OPERAND",
            ErrorKind::InvalidRelativeOrDirectOperand => "INVALID_RELATIVE_OR_DIRECT_OPERAND",
            ErrorKind::InvalidImmediateOperand => "INVALID_IMMEDIATE_OPERAND",
            ErrorKind::InvalidImmediateDirectOrRegisterOperand => {
                "INVALID_IMMEDIATE_DIRECT_OR_REGISTER_OPERAND"
            }
            ErrorKind::InvalidDataNoNumber => "INVALID_DATA_NO_NUMBER",
            ErrorKind::InvalidDataNonNumeric => "INVALID_DATA_NON_NUMERIC",
            ErrorKind::InvalidDataRealNumber => "INVALID_DATA_REAL_NUMBER",
            ErrorKind::InvalidDataTooLarge => "INVALID_DATA_TOO_LARGE",
            ErrorKind::InvalidDataMissingComma => "INVALID_DATA_MISSING_COMMA",
            ErrorKind::InvalidDataTrailingComma => "INVALID_DATA_TRAILING_COMMA",
            ErrorKind::InvalidDataUnexpectedChar => "INVALID_DATA_UNEXPECTED_CHAR",
            ErrorKind::InvalidStringNoQuote => "INVALID_STRING_NO_QUOTE",
            ErrorKind::InvalidStringMissingEndQuote => "INVALID_STRING_MISSING_END_QUOTE",
            ErrorKind::InvalidStringExtraChars => "INVALID_STRING_EXTRA_CHARS",
            ErrorKind::StringNoValue => "STRING_NO_VALUE",
            ErrorKind::InvalidStorageDirective => "INVALID_STORAGE_DIRECTIVE",
        }
    }

    /// Human-readable message shown after the bracketed name.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::MissingAsFile => "Missing source file - please provide a .as file",
            ErrorKind::FilenameTooLong => "File name is too long - please use a shorter name",
            ErrorKind::FileNotExist => "Could not find the specified file",
            ErrorKind::FileRead => {
                "Could not read from file - check if file exists and permissions"
            }
            ErrorKind::FileWrite => "Could not write to output file - check permissions",
            ErrorKind::FileDelete => "Failed to delete the temporary .am file",
            ErrorKind::ObjectFileCreate => "Failed to create object file",
            ErrorKind::EntryFileCreate => "Failed to create entry file",
            ErrorKind::ExternalFileCreate => "Failed to create externals file",
            ErrorKind::LineTooLong => "Line is too long - maximum length is 80 characters",
            ErrorKind::MemoryAllocation => {
                "Not enough memory available to complete operation"
            }
            ErrorKind::AssemblyFailed => {
                "Assembly process failed, could not generate output file"
            }
            ErrorKind::VpcStorageFull => {
                "VirtualPC storage is full - cannot store additional data"
            }
            ErrorKind::McroNoName => "Macro is missing a name",
            ErrorKind::McroDuplicate => "Macro name already exists - use a different name",
            ErrorKind::McroBeforeDef => "Trying to use macro before defining it",
            ErrorKind::McroTooLong => "Macro name exceeds the maximum allowed length",
            ErrorKind::McroIsRegister => "Macro name cannot be a register name",
            ErrorKind::McroIllegalChar => "Macro name contains an illegal character",
            ErrorKind::McroIllegalStart => "Macro name cannot start with a non-letter character",
            ErrorKind::McroReservedName => "Macro name cannot be a reserved word",
            ErrorKind::McroIllegalName => "Invalid macro name - use only letters and numbers",
            ErrorKind::McroUnexpectedText => {
                "Unexpected text after macro name. Only the macro name should follow 'mcro'"
            }
            ErrorKind::MacroCallExtraText => {
                "Macro call must appear alone on the line or be followed only by a comment"
            }
            ErrorKind::LabelTooLong => "Label name is too long - maximum length is 30 characters",
            ErrorKind::IllegalLabelStart => {
                "Invalid label name - start with letter, use only letters and numbers for the rest"
            }
            ErrorKind::IllegalLabelChar => "Invalid label name - use only letters and numbers",
            ErrorKind::LabelIsReservedWord => "Invalid label name - cannot use reserved words",
            ErrorKind::LabelIsRegister => "Invalid label name - cannot use register names",
            ErrorKind::LabelDuplicate => "Duplicate label found - use a different name",
            ErrorKind::LabelIsMcroName => {
                "Label name conflicts with macro name - use a different name"
            }
            ErrorKind::LabelAlreadyExtern => {
                "Label is already declared as extern and cannot be redefined"
            }
            ErrorKind::ExternLabelConflict => {
                "Extern label conflicts with a label declared in this file"
            }
            ErrorKind::UndefinedLabel => {
                "Label not defined in the file - try declaring it before using"
            }
            ErrorKind::UndefinedLabelRelative => {
                "Undefined label - label not found in the label table for relative addressing"
            }
            ErrorKind::UndefinedEntryLabel => {
                "Label not defined in the file - cannot use as an entry"
            }
            ErrorKind::LabelNotDefinedInFile => {
                "Label is declared as .extern and cannot be used as an entry"
            }
            ErrorKind::LabelUsedInSameLine => {
                "Label cannot be used as an operand on the same line it is defined"
            }
            ErrorKind::RelativeAddressingExternalLabel => {
                "Cannot use relative addressing with an external label"
            }
            ErrorKind::RelativeAddressingToData => {
                "Relative addressing is not allowed for labels pointing to data"
            }
            ErrorKind::DuplicateEntryLabel => "Label is already declared as .entry",
            ErrorKind::InvalidLabelContent => {
                "Label content must be a valid .data/.string directive or a valid command"
            }
            ErrorKind::EntryMissingLabel => "Missing label after .entry directive",
            ErrorKind::ExternMissingLabel => "Missing label after .extern directive",
            ErrorKind::EntryExtraText => {
                "Unexpected text after entry label. Only spaces or a comment are allowed"
            }
            ErrorKind::ExternExtraText => {
                "Unexpected text after extern label. Only spaces or a comment are allowed"
            }
            ErrorKind::MaybeMeantEntry => {
                "Unexpected characters after '.entry'. Did you mean '.entry <label>'?"
            }
            ErrorKind::MaybeMeantExtern => {
                "Unexpected characters after '.extern'. Did you mean '.extern <label>'?"
            }
            ErrorKind::NotExternLine => "Line is not a valid .extern directive",
            ErrorKind::NotEntryLine => "Line is not a valid .entry directive",
            ErrorKind::EntryInsteadOfExtern => "Invalid use of .entry. Expected .extern instead",
            ErrorKind::UnknownCommand => "Unknown command - not recognized by the assembler",
            ErrorKind::InvalidParamCount => "Missing parameters - check the command syntax",
            ErrorKind::MissingComma => "Missing comma between parameters - add a comma",
            ErrorKind::ConsecutiveCommas => "Consecutive commas detected - remove extra commas",
            ErrorKind::ExtraTextAfterCommand => "Extra text after command - remove unnecessary text",
            ErrorKind::InvalidDirectOrRegisterOperand => {
                "Invalid operand. Expected Direct Addressing or Register Address Direct"
            }
            ErrorKind::InvalidImmediateDirectOrRegisterFirstOperand => {
                "Invalid first operand. Must be Immediate Address, Direct Addressing, or Register Address Direct"
            }
            ErrorKind::InvalidImmediateDirectOrRegisterSecondOperand => {
                "Invalid second operand. Must be Immediate Address, Direct Addressing, or Register Address Direct"
            }
            ErrorKind::InvalidDirectOrRegisterSecondOperand => {
                "Invalid second operand. Must be Direct Addressing or Register Address Direct"
            }
            ErrorKind::InvalidDirectFirstOperand => {
                "Invalid first operand. Must be Direct Addressing"
            }
            ErrorKind::InvalidRelativeOrDirectOperand => {
                "Invalid operand. Expected Relative Addressing or Direct Addressing"
            }
            ErrorKind::InvalidImmediateOperand => {
                "Invalid numeric value. Expected Immediate Address"
            }
            ErrorKind::InvalidImmediateDirectOrRegisterOperand => {
                "Invalid operand. Expected Immediate Address, Direct Addressing, or Register Address Direct"
            }
            ErrorKind::InvalidDataNoNumber => {
                "Invalid .data directive: Must be followed by at least one number"
            }
            ErrorKind::InvalidDataNonNumeric => {
                "Invalid .data directive: Contains a non-numeric value"
            }
            ErrorKind::InvalidDataRealNumber => "Invalid numeric value. Expected an integer",
            ErrorKind::InvalidDataTooLarge => {
                "Integer in .data directive exceeds 24-bit limit"
            }
            ErrorKind::InvalidDataMissingComma => {
                "Invalid .data directive: Missing comma between numbers"
            }
            ErrorKind::InvalidDataTrailingComma => {
                "Invalid .data directive: Trailing comma detected"
            }
            ErrorKind::InvalidDataUnexpectedChar => {
                "Invalid .data directive: Unexpected character found"
            }
            ErrorKind::InvalidStringNoQuote => {
                "Invalid .string directive: Must start with a double quote"
            }
            ErrorKind::InvalidStringMissingEndQuote => {
                "Invalid .string directive: Missing closing double quote"
            }
            ErrorKind::InvalidStringExtraChars => {
                "Invalid .string directive: Unexpected characters after closing quote"
            }
            ErrorKind::StringNoValue => "Missing string value after .string directive",
            ErrorKind::InvalidStorageDirective => {
                "Invalid storage instruction. Expected .data or .string directive"
            }
        }
    }
}

impl WarningKind {
    pub fn name(self) -> &'static str {
        match self {
            WarningKind::LabelBeforeExtern => "LABEL_BEFORE_EXTERN",
            WarningKind::LabelBeforeEntry => "LABEL_BEFORE_ENTRY",
            WarningKind::RedundantEntry => "REDUNDANT_ENTRY",
            WarningKind::LabelResemblesInvalidRegister => "LABEL_RESEMBLES_INVALID_REGISTER",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            WarningKind::LabelBeforeExtern => "Label before .extern directive is ignored",
            WarningKind::LabelBeforeEntry => "Label before .entry directive is ignored",
            WarningKind::RedundantEntry => "Label declared multiple times as .entry",
            WarningKind::LabelResemblesInvalidRegister => {
                "Label name resembles an invalid register (e.g., r9) - valid registers are r0 to r7"
            }
        }
    }
}

/// One reported problem: a kind plus where it was seen.
///
/// `excerpt` carries the offending slice of the source line for the
/// `<<<-- ERROR HERE` form of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: Option<usize>,
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error(ErrorKind),
    Warning(WarningKind),
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, line: usize) -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::Error(kind),
            line: Some(line),
            excerpt: None,
        }
    }

    pub fn error_with_excerpt(kind: ErrorKind, line: usize, excerpt: &str) -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::Error(kind),
            line: Some(line),
            excerpt: Some(excerpt.to_string()),
        }
    }

    pub fn error_no_line(kind: ErrorKind) -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::Error(kind),
            line: None,
            excerpt: None,
        }
    }

    pub fn warning(kind: WarningKind, line: usize) -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::Warning(kind),
            line: Some(line),
            excerpt: None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, DiagnosticKind::Error(_))
    }

    /// The error kind, if this diagnostic is an error.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.kind {
            DiagnosticKind::Error(kind) => Some(kind),
            DiagnosticKind::Warning(_) => None,
        }
    }

    pub fn warning_kind(&self) -> Option<WarningKind> {
        match self.kind {
            DiagnosticKind::Warning(kind) => Some(kind),
            DiagnosticKind::Error(_) => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (severity, name, message) = match self.kind {
            DiagnosticKind::Error(kind) => ("Error", kind.name(), kind.message()),
            DiagnosticKind::Warning(kind) => ("Warning", kind.name(), kind.message()),
        };
        match self.line {
            Some(line) => write!(f, "{} at line {}: [{}] {}", severity, line, name, message)?,
            None => write!(f, "{}: [{}] {}", severity, name, message)?,
        }
        if let Some(excerpt) = &self.excerpt {
            write!(f, " \n       {} <<<-- ERROR HERE", excerpt)?;
        }
        Ok(())
    }
}
