//! Built-in formula functions.
//!
//! Functions are pure text-in/text-out: they see their operands and the
//! formula config, never the row. [`FUNCTIONS`] lists them in the order the
//! evaluator solves them.

use std::fmt;
use std::str::FromStr;

use sha2::Digest;
use tracing::{debug, warn};

use crate::config::FormulaConfig;
use crate::error::{FormulaError, Result};

/// Accepted operand count of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// One function call being solved.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    /// Full call text, used in error messages.
    pub text: &'a str,
    pub operands: &'a [String],
    pub config: &'a FormulaConfig,
}

impl Call<'_> {
    fn number<T: FromStr>(&self, operand: &str) -> Result<T> {
        operand
            .trim()
            .parse()
            .map_err(|_| FormulaError::InvalidNumber {
                text: self.text.to_string(),
                operand: operand.to_string(),
            })
    }

    /// A character count operand: a non-negative 32-bit integer no larger
    /// than `limit`.
    fn length(&self, operand: &str, limit: usize) -> Result<usize> {
        let count: u32 = self.number(operand)?;
        let count = count as usize;
        if count > limit {
            return Err(FormulaError::InvalidNumber {
                text: self.text.to_string(),
                operand: operand.to_string(),
            });
        }
        Ok(count)
    }
}

pub type FunctionImpl = fn(&Call<'_>) -> Result<String>;

pub struct FunctionSpec {
    pub name: &'static str,
    pub arity: Arity,
    pub summary: &'static str,
    pub implementation: FunctionImpl,
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl FunctionSpec {
    /// Validates the operand count, then runs the function.
    pub fn call(&self, call: &Call<'_>) -> Result<String> {
        if !self.arity.accepts(call.operands.len()) {
            return Err(FormulaError::WrongArity {
                text: call.text.to_string(),
                expected: self.arity,
                found: call.operands.len(),
            });
        }
        (self.implementation)(call)
    }
}

pub const AND: &str = "AND";
pub const OR: &str = "OR";
pub const SUM: &str = "SUM";
pub const ZERO_PADDING: &str = "ZERO_PADDING";
pub const RIGHT_TRIM: &str = "RIGHT_TRIM";
pub const LEFT_TRIM: &str = "LEFT_TRIM";
pub const IF: &str = "IF";
pub const IF_NOT_NULL: &str = "IF_NOT_NULL";
pub const HASH: &str = "HASH";
pub const NEXT: &str = "NEXT";

pub static FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: AND,
        arity: Arity::AtLeast(2),
        summary: "true when every operand is truthy",
        implementation: and_fn,
    },
    FunctionSpec {
        name: OR,
        arity: Arity::AtLeast(2),
        summary: "true when any operand is truthy",
        implementation: or_fn,
    },
    FunctionSpec {
        name: SUM,
        arity: Arity::AtLeast(2),
        summary: "numeric sum, empty when an operand is empty",
        implementation: sum_fn,
    },
    FunctionSpec {
        name: ZERO_PADDING,
        arity: Arity::Exact(2),
        summary: "left-pad text with zeros up to n characters",
        implementation: zero_padding_fn,
    },
    FunctionSpec {
        name: RIGHT_TRIM,
        arity: Arity::Exact(2),
        summary: "keep the last n characters",
        implementation: right_trim_fn,
    },
    FunctionSpec {
        name: LEFT_TRIM,
        arity: Arity::Exact(2),
        summary: "keep the first n characters",
        implementation: left_trim_fn,
    },
    FunctionSpec {
        name: IF,
        arity: Arity::Exact(3),
        summary: "second operand if the condition is truthy, else the third",
        implementation: if_fn,
    },
    FunctionSpec {
        name: IF_NOT_NULL,
        arity: Arity::Exact(3),
        summary: "second operand if the condition is non-empty, else the third",
        implementation: if_not_null_fn,
    },
    FunctionSpec {
        name: HASH,
        arity: Arity::Exact(2),
        summary: "uppercase hex digest (MD5, SHA-1, SHA-224, SHA-256, SHA-384, SHA-512)",
        implementation: hash_fn,
    },
    FunctionSpec {
        name: NEXT,
        arity: Arity::Exact(0),
        summary: "random UUID",
        implementation: next_fn,
    },
];

pub fn lookup(name: &str) -> Option<&'static FunctionSpec> {
    FUNCTIONS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

/// Solves a call of a named function.
pub fn call(name: &str, call: &Call<'_>) -> Result<String> {
    let spec = lookup(name).ok_or_else(|| FormulaError::UnknownFunction {
        name: name.to_string(),
    })?;
    spec.call(call)
}

fn and_fn(call: &Call<'_>) -> Result<String> {
    let result = call.operands.iter().all(|op| call.config.is_true(op));
    Ok(call.config.bool_text(result).to_string())
}

fn or_fn(call: &Call<'_>) -> Result<String> {
    let result = call.operands.iter().any(|op| call.config.is_true(op));
    Ok(call.config.bool_text(result).to_string())
}

fn sum_fn(call: &Call<'_>) -> Result<String> {
    let mut total = 0.0_f64;
    for operand in call.operands {
        if operand.trim().is_empty() {
            warn!(
                operands = ?call.operands,
                "an operand of SUM is empty, returning empty value"
            );
            return Ok(String::new());
        }
        let value: f64 = call.number(operand)?;
        if !value.is_finite() {
            return Err(FormulaError::InvalidNumber {
                text: call.text.to_string(),
                operand: operand.clone(),
            });
        }
        total += value;
    }
    Ok(format_number(total))
}

/// Integral values print without a fractional part.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Widest result `ZERO_PADDING` will build.
pub const MAX_PADDED_WIDTH: usize = 65_536;

fn zero_padding_fn(call: &Call<'_>) -> Result<String> {
    let text = &call.operands[0];
    let width = call.length(&call.operands[1], MAX_PADDED_WIDTH)?;
    let missing = width.saturating_sub(text.chars().count());
    Ok(format!("{}{text}", "0".repeat(missing)))
}

fn left_trim_fn(call: &Call<'_>) -> Result<String> {
    let count = call.length(&call.operands[1], i32::MAX as usize)?;
    Ok(call.operands[0].chars().take(count).collect())
}

fn right_trim_fn(call: &Call<'_>) -> Result<String> {
    let text = &call.operands[0];
    let count = call.length(&call.operands[1], i32::MAX as usize)?;
    let skip = text.chars().count().saturating_sub(count);
    Ok(text.chars().skip(skip).collect())
}

fn if_fn(call: &Call<'_>) -> Result<String> {
    let chosen = if call.config.is_true(&call.operands[0]) {
        &call.operands[1]
    } else {
        &call.operands[2]
    };
    Ok(chosen.clone())
}

fn if_not_null_fn(call: &Call<'_>) -> Result<String> {
    let chosen = if call.operands[0].is_empty() {
        &call.operands[2]
    } else {
        &call.operands[1]
    };
    Ok(chosen.clone())
}

/// Digest algorithms accepted by HASH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn digest_hex(self, bytes: &[u8]) -> String {
        match self {
            HashAlgorithm::Md5 => hex::encode_upper(md5::Md5::digest(bytes)),
            HashAlgorithm::Sha1 => hex::encode_upper(sha1::Sha1::digest(bytes)),
            HashAlgorithm::Sha224 => hex::encode_upper(sha2::Sha224::digest(bytes)),
            HashAlgorithm::Sha256 => hex::encode_upper(sha2::Sha256::digest(bytes)),
            HashAlgorithm::Sha384 => hex::encode_upper(sha2::Sha384::digest(bytes)),
            HashAlgorithm::Sha512 => hex::encode_upper(sha2::Sha512::digest(bytes)),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "MD5" => Ok(HashAlgorithm::Md5),
            "SHA1" => Ok(HashAlgorithm::Sha1),
            "SHA224" => Ok(HashAlgorithm::Sha224),
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA384" => Ok(HashAlgorithm::Sha384),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            _ => Err(FormulaError::UnsupportedHash {
                algorithm: s.trim().to_string(),
            }),
        }
    }
}

fn hash_fn(call: &Call<'_>) -> Result<String> {
    let algorithm: HashAlgorithm = call.operands[0].parse()?;
    let value = &call.operands[1];
    debug!(?algorithm, value = %value, "computing HASH");
    Ok(algorithm.digest_hex(value.as_bytes()))
}

fn next_fn(_call: &Call<'_>) -> Result<String> {
    Ok(uuid::Uuid::new_v4().to_string())
}
