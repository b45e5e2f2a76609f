//! Formula fragments: the recognised sub-expressions of a formula.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Which part of a cell a reference reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellPart {
    #[default]
    Code,
    Label,
}

impl CellPart {
    pub const fn as_str(self) -> &'static str {
        match self {
            CellPart::Code => "code",
            CellPart::Label => "label",
        }
    }
}

impl fmt::Display for CellPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellPart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(CellPart::Code),
            "label" => Ok(CellPart::Label),
            other => Err(format!("unknown cell part: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equal,
    NotEqual,
}

impl Comparator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
        }
    }

    pub fn apply(self, lhs: &str, rhs: &str) -> bool {
        let equal = lhs.trim() == rhs.trim();
        match self {
            Comparator::Equal => equal,
            Comparator::NotEqual => !equal,
        }
    }
}

/// What a fragment refers to, parsed out of its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentKind {
    /// `%NAME` constant.
    Keyword { name: String },
    /// `%ROW_ID` / `%TABLE_NAME`, read from the row itself.
    RowKeyword { name: String },
    /// `%column.code` / `%column.label`.
    Column { column: String, part: CellPart },
    /// `RELATION(Parent,field.part)`.
    Relation {
        parent: String,
        field: String,
        part: CellPart,
    },
    /// `lhs==rhs` / `lhs!=rhs`.
    Comparison {
        lhs: String,
        comparator: Comparator,
        rhs: String,
    },
    /// `NAME(op1,op2,...)`.
    Function { name: String, operands: Vec<String> },
}

impl FragmentKind {
    /// Whether solving needs the row being evaluated.
    pub fn uses_row(&self) -> bool {
        matches!(
            self,
            FragmentKind::RowKeyword { .. }
                | FragmentKind::Column { .. }
                | FragmentKind::Relation { .. }
        )
    }
}

/// A fragment found in a formula text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    unsolved: String,
    span: Range<usize>,
    solved: Option<String>,
}

impl Fragment {
    pub(crate) fn new(kind: FragmentKind, unsolved: &str, span: Range<usize>) -> Self {
        Self {
            kind,
            unsolved: unsolved.to_string(),
            span,
            solved: None,
        }
    }

    pub fn unsolved(&self) -> &str {
        &self.unsolved
    }

    /// Byte range of the fragment in the text it was found in.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn solved(&self) -> Option<&str> {
        self.solved.as_deref()
    }

    pub fn resolve(&mut self, value: String) {
        self.solved = Some(value);
    }
}

/// Ordered, non-overlapping fragments of one kind found in a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaList {
    fragments: Vec<Fragment>,
}

impl FormulaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn extend(&mut self, other: FormulaList) {
        self.fragments.extend(other.fragments);
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Fragment> {
        self.fragments.iter_mut()
    }

    /// Rebuilds `source` from the gaps between fragments and the text `render`
    /// gives for each fragment. Fragments must come from scanning `source`.
    pub fn splice<'a>(&'a self, source: &str, render: impl Fn(&'a Fragment) -> &'a str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for fragment in &self.fragments {
            out.push_str(&source[cursor..fragment.span.start]);
            out.push_str(render(fragment));
            cursor = fragment.span.end;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

impl<'a> IntoIterator for &'a FormulaList {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

impl IntoIterator for FormulaList {
    type Item = Fragment;
    type IntoIter = std::vec::IntoIter<Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.into_iter()
    }
}
