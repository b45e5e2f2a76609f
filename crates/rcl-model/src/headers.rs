//! Field headers: the named column properties that may hold formula text.
//!
//! A solved formula is written back into the row according to the header it
//! came from. Label headers only touch the label, code headers only the code,
//! everything else sets both.

/// Default value of the column, written as both code and label.
pub const DEFAULT_VALUE: &str = "defaultValue";
/// Default code of the column.
pub const DEFAULT_CODE: &str = "defaultCode";
/// Formula computing the code of the cell.
pub const CODE_FORMULA: &str = "codeFormula";
/// Formula computing the label of the cell.
pub const LABEL_FORMULA: &str = "labelFormula";

/// The part of a cell a solved value is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    Code,
    Label,
    Both,
}

impl WriteTarget {
    pub fn for_header(header: &str) -> Self {
        match header {
            LABEL_FORMULA => WriteTarget::Label,
            CODE_FORMULA | DEFAULT_CODE => WriteTarget::Code,
            _ => WriteTarget::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_targets() {
        assert_eq!(WriteTarget::for_header(LABEL_FORMULA), WriteTarget::Label);
        assert_eq!(WriteTarget::for_header(DEFAULT_CODE), WriteTarget::Code);
        assert_eq!(WriteTarget::for_header(CODE_FORMULA), WriteTarget::Code);
        assert_eq!(WriteTarget::for_header(DEFAULT_VALUE), WriteTarget::Both);
        assert_eq!(WriteTarget::for_header("somethingElse"), WriteTarget::Both);
    }
}
