//! Listing order.
//!
//! Two independent axes (key and direction) plus an optional directories-first
//! partition. Every comparison falls back to the ordinal name, so the order is
//! total and re-sorting a sorted listing never changes it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use webindexer_storage::Entry;

use crate::error::{Error, Result};

/// Sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Last-modified timestamp; entries without one come first
    #[serde(alias = "last_modified")]
    Date,
    /// Byte-wise name
    Name,
    /// Name with digit runs compared numerically
    #[default]
    NaturalName,
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date" | "last_modified" => Ok(SortBy::Date),
            "name" => Ok(SortBy::Name),
            "natural_name" => Ok(SortBy::NaturalName),
            other => Err(Error::Config(format!(
                "sort_by must be one of: date, name, natural_name (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Date => write!(f, "date"),
            SortBy::Name => write!(f, "name"),
            SortBy::NaturalName => write!(f, "natural_name"),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            other => Err(Error::Config(format!(
                "order must be one of: asc, desc (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Asc => write!(f, "asc"),
            Order::Desc => write!(f, "desc"),
        }
    }
}

/// Complete ordering policy for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortPolicy {
    pub sort_by: SortBy,
    pub order: Order,
    pub dirs_first: bool,
}

impl SortPolicy {
    pub fn new(sort_by: SortBy, order: Order, dirs_first: bool) -> Self {
        Self {
            sort_by,
            order,
            dirs_first,
        }
    }

    /// Compare two entries by key and direction, ties broken by ordinal name.
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let primary = match self.sort_by {
            SortBy::Date => a.last_modified.cmp(&b.last_modified),
            SortBy::Name => a.name.cmp(&b.name),
            SortBy::NaturalName => natural_cmp(&a.name, &b.name),
        };
        let primary = match self.order {
            Order::Asc => primary,
            Order::Desc => primary.reverse(),
        };
        primary.then_with(|| a.name.cmp(&b.name))
    }

    /// Sort a listing in place.
    pub fn sort(&self, entries: &mut Vec<Entry>) {
        if self.dirs_first {
            let (mut dirs, mut files): (Vec<_>, Vec<_>) =
                entries.drain(..).partition(|e| e.is_dir);
            dirs.sort_by(|a, b| self.compare(a, b));
            files.sort_by(|a, b| self.compare(a, b));
            entries.extend(dirs);
            entries.extend(files);
        } else {
            entries.sort_by(|a, b| self.compare(a, b));
        }
    }
}

/// Compare names so that `file2` sorts before `file10`.
///
/// Digit runs compare by numeric value (leading zeros ignored), everything
/// else compares byte-wise. Names differing only in leading zeros compare
/// equal here.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.as_bytes();
    let mut b = b.as_bytes();

    loop {
        match (a.first(), b.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (a_num, a_rest) = split_digits(a);
                let (b_num, b_rest) = split_digits(b);
                let a_num = trim_zeros(a_num);
                let b_num = trim_zeros(b_num);

                let ord = a_num.len().cmp(&b_num.len()).then_with(|| a_num.cmp(b_num));
                if ord != Ordering::Equal {
                    return ord;
                }
                a = a_rest;
                b = b_rest;
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(y);
                }
                a = &a[1..];
                b = &b[1..];
            }
        }
    }
}

fn split_digits(s: &[u8]) -> (&[u8], &[u8]) {
    let end = s.iter().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn trim_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
    &s[start..]
}
