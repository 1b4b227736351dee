use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::VisionError;

/// Maps a class index to its label.
///
/// `Ok(None)` means the table has no entry and resolves to an empty label.
/// `Err` is reserved for lookups that genuinely fail and aborts decoding.
pub trait ClassNames {
    fn class_name(&self, index: usize) -> Result<Option<String>, VisionError>;
}

/// Ordered label table, one label per class index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLabels(Vec<String>);

impl ClassLabels {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Parses label-file text: one label per line, in class order.
    pub fn from_lines(text: &str) -> Self {
        Self(text.lines().map(|line| line.trim_end_matches('\r').to_owned()).collect())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for ClassLabels {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

impl ClassNames for ClassLabels {
    fn class_name(&self, index: usize) -> Result<Option<String>, VisionError> {
        Ok(self.get(index).map(str::to_owned))
    }
}

impl ClassNames for [String] {
    fn class_name(&self, index: usize) -> Result<Option<String>, VisionError> {
        Ok(self.get(index).cloned())
    }
}

impl ClassNames for Vec<String> {
    fn class_name(&self, index: usize) -> Result<Option<String>, VisionError> {
        self.as_slice().class_name(index)
    }
}

impl ClassNames for [&str] {
    fn class_name(&self, index: usize) -> Result<Option<String>, VisionError> {
        Ok(self.get(index).map(|s| (*s).to_owned()))
    }
}

impl<T: ClassNames + ?Sized> ClassNames for &T {
    fn class_name(&self, index: usize) -> Result<Option<String>, VisionError> {
        (**self).class_name(index)
    }
}

/// Adapts a fallible closure into a [`ClassNames`] lookup.
pub struct LookupFn<F>(pub F);

impl<F, E> ClassNames for LookupFn<F>
where
    F: Fn(usize) -> Result<Option<String>, E>,
    E: Display,
{
    fn class_name(&self, index: usize) -> Result<Option<String>, VisionError> {
        (self.0)(index).map_err(|e| VisionError::LabelLookup(e.to_string()))
    }
}
