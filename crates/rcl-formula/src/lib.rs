//! Formula engine for table cells.
//!
//! Column definitions carry formula text per field header (`defaultValue`,
//! `codeFormula`, `labelFormula`, ...). [`FormulaSolver`] orders the formulas
//! of a row by their dependencies on sibling columns and solves them with the
//! [`Evaluator`], writing the results back into the row.

pub mod config;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod finder;
pub mod fragment;
pub mod functions;
pub mod keywords;
pub mod solver;

pub use config::FormulaConfig;
pub use dependency::DependencyCache;
pub use error::{FormulaError, Result};
pub use evaluator::Evaluator;
pub use fragment::{CellPart, Comparator, FormulaList, Fragment, FragmentKind};
pub use functions::{Arity, FUNCTIONS, FunctionSpec};
pub use solver::{Formula, FormulaSolver};
