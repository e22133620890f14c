//! Discovered field labels

use std::fmt;

use crate::{BitRange, FieldType};

/// A discovered field: bit range, field type and display color
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    /// Bits covered by the field
    pub range: BitRange,
    /// What the field was recognized as
    pub field_type: FieldType,
    /// Display color slot
    pub color_index: usize,
}

impl Label {
    pub fn new(field_type: FieldType, range: BitRange, color_index: usize) -> Self {
        Label {
            range,
            field_type,
            color_index,
        }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.field_type.name()
    }

    /// Same label with another color slot
    pub fn with_color(mut self, color_index: usize) -> Self {
        self.color_index = color_index;
        self
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({} {} color={})", self.name(), self.range, self.color_index)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.range)
    }
}
