//! Column types and modifier flags

use cf_core::sql_utils::escape_sql_string;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Modifier flags accepted by column-adding and statement-initiating calls
    ///
    /// `NULLABLE`, `DEFAULT_ZERO` and `HIERARCHICAL` modify a column type;
    /// `IF_NOT_EXISTS` and `IF_EXISTS` are read by create and drop statements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColumnFlags: u8 {
        const NULLABLE = 0b0000_0001;
        const IF_NOT_EXISTS = 0b0000_0010;
        const IF_EXISTS = 0b0000_0100;
        const DEFAULT_ZERO = 0b0000_1000;
        const HIERARCHICAL = 0b0001_0000;
    }
}

impl ColumnFlags {
    pub const NONE: Self = Self::empty();
}

impl Default for ColumnFlags {
    fn default() -> Self {
        Self::NONE
    }
}

/// Base column type, before modifier flags are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// `DateTime{size}`, e.g. `DateTime64`
    DateTime { size: u8 },
    Uuid,
    String,
    /// `Decimal(precision, scale)`
    Decimal { precision: u8, scale: u8 },
    /// `Enum{size}('label' = n,...)`, labels in declaration order
    Enum { size: u8, values: Vec<(String, i64)> },
    UInt { size: u8 },
    Int { size: u8 },
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::DateTime { size } => write!(f, "DateTime{size}"),
            ColumnType::Uuid => f.write_str("UUID"),
            ColumnType::String => f.write_str("String"),
            ColumnType::Decimal { precision, scale } => write!(f, "Decimal({precision}, {scale})"),
            ColumnType::Enum { size, values } => {
                let labels: Vec<String> = values
                    .iter()
                    .map(|(label, n)| format!("'{}' = {}", escape_sql_string(label), n))
                    .collect();
                write!(f, "Enum{}({})", size, labels.join(","))
            }
            ColumnType::UInt { size } => write!(f, "UInt{size}"),
            ColumnType::Int { size } => write!(f, "Int{size}"),
        }
    }
}

/// A named column with its modifier flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub flags: ColumnFlags,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType, flags: ColumnFlags) -> Self {
        Self {
            name: name.into(),
            column_type,
            flags,
        }
    }

    /// Rendered type with flags applied
    ///
    /// Default-zero wraps first, then nullable, then the hierarchical suffix:
    /// `Nullable(UInt64 default 0) HIERARCHICAL`.
    pub fn rendered_type(&self) -> String {
        let mut out = self.column_type.to_string();
        if self.flags.contains(ColumnFlags::DEFAULT_ZERO) {
            out = format!("{out} default 0");
        }
        if self.flags.contains(ColumnFlags::NULLABLE) {
            out = format!("Nullable({out})");
        }
        if self.flags.contains(ColumnFlags::HIERARCHICAL) {
            out.push_str(" HIERARCHICAL");
        }
        out
    }

    /// `name Type` as it appears in a column list
    pub fn definition(&self) -> String {
        format!("{} {}", self.name, self.rendered_type())
    }
}
