use std::fmt::{self, Display};

use crate::{MlErr, Result};

/// The per-sample shape of an array, excluding the batch dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Creates a new `Shape`.
    ///
    /// # Arguments
    /// * `dims` - The dimensions, outermost first.
    ///
    /// # Returns
    /// An error if `dims` is empty or any dimension is zero.
    pub fn new<I>(dims: I) -> Result<Self>
    where
        I: Into<Vec<usize>>,
    {
        let dims = dims.into();

        if dims.is_empty() {
            return Err(MlErr::InvalidInput("shapes must have at least one dimension"));
        }

        if dims.contains(&0) {
            return Err(MlErr::InvalidInput("shape dimensions must be positive"));
        }

        Ok(Self(dims))
    }

    /// Returns the dimensions of this shape.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Returns the total number of elements a conforming sample has.
    pub fn size(&self) -> usize {
        self.0.iter().product()
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
