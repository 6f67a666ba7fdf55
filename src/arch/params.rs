use ndarray::{Array1, Array2};

use crate::{MlErr, Result};

/// A tree of parameter arrays.
///
/// The tree's structure mirrors the structure of the model that produced it:
/// a dense layer owns a weight matrix and a bias vector, a parameterless
/// layer owns nothing, and a layer chain owns a list with one entry per
/// layer. Gradients reuse the same representation, so an update rule only
/// has to walk two trees of identical structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// A layer with no trainable parameters.
    Empty,
    /// A dense layer's weights (`[in, out]`) and biases (`[out]`).
    Dense {
        weights: Array2<f32>,
        biases: Array1<f32>,
    },
    /// One subtree per layer of a chain.
    List(Vec<Params>),
}

impl Params {
    /// Returns a tree of the same structure with every value set to zero.
    pub fn zeros_like(&self) -> Params {
        match self {
            Params::Empty => Params::Empty,
            Params::Dense { weights, biases } => Params::Dense {
                weights: Array2::zeros(weights.raw_dim()),
                biases: Array1::zeros(biases.raw_dim()),
            },
            Params::List(items) => Params::List(items.iter().map(Params::zeros_like).collect()),
        }
    }

    /// Applies `f` to every value, leaving the structure untouched.
    pub fn map<F>(&self, f: F) -> Params
    where
        F: Fn(f32) -> f32 + Copy,
    {
        match self {
            Params::Empty => Params::Empty,
            Params::Dense { weights, biases } => Params::Dense {
                weights: weights.mapv(f),
                biases: biases.mapv(f),
            },
            Params::List(items) => Params::List(items.iter().map(|p| p.map(f)).collect()),
        }
    }

    /// Combines two trees of identical structure value by value.
    ///
    /// # Arguments
    /// * `other` - The tree to combine with, typically a gradient.
    /// * `f` - The combination, applied as `f(self_value, other_value)`.
    ///
    /// # Returns
    /// An error if the trees disagree on structure or leaf shapes.
    pub fn zip_with<F>(&self, other: &Params, f: F) -> Result<Params>
    where
        F: Fn(f32, f32) -> f32 + Copy,
    {
        match (self, other) {
            (Params::Empty, Params::Empty) => Ok(Params::Empty),
            (
                Params::Dense { weights, biases },
                Params::Dense {
                    weights: other_weights,
                    biases: other_biases,
                },
            ) => {
                if weights.dim() != other_weights.dim() {
                    return Err(MlErr::ShapeMismatch {
                        what: "weights",
                        got: other_weights.len(),
                        expected: weights.len(),
                    });
                }

                if biases.dim() != other_biases.dim() {
                    return Err(MlErr::ShapeMismatch {
                        what: "biases",
                        got: other_biases.len(),
                        expected: biases.len(),
                    });
                }

                let mut weights = weights.clone();
                weights.zip_mut_with(other_weights, |a, &b| *a = f(*a, b));
                let mut biases = biases.clone();
                biases.zip_mut_with(other_biases, |a, &b| *a = f(*a, b));

                Ok(Params::Dense { weights, biases })
            }
            (Params::List(items), Params::List(other_items)) => {
                if items.len() != other_items.len() {
                    return Err(MlErr::StructureMismatch { what: "list" });
                }

                let zipped = items
                    .iter()
                    .zip(other_items)
                    .map(|(a, b)| a.zip_with(b, f))
                    .collect::<Result<_>>()?;

                Ok(Params::List(zipped))
            }
            _ => Err(MlErr::StructureMismatch { what: "leaf" }),
        }
    }

    /// Views this tree as a dense layer's weights and biases.
    pub fn as_dense(&self) -> Result<(&Array2<f32>, &Array1<f32>)> {
        match self {
            Params::Dense { weights, biases } => Ok((weights, biases)),
            _ => Err(MlErr::StructureMismatch { what: "dense leaf" }),
        }
    }

    /// Views this tree as a list of per-layer subtrees.
    pub fn as_list(&self) -> Result<&[Params]> {
        match self {
            Params::List(items) => Ok(items),
            _ => Err(MlErr::StructureMismatch { what: "list" }),
        }
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    fn leaf() -> Params {
        Params::Dense {
            weights: array![[1.0, 2.0], [3.0, 4.0]],
            biases: array![5.0, 6.0],
        }
    }

    #[test]
    fn test_zeros_like_preserves_structure() {
        let zeros = Params::List(vec![leaf(), Params::Empty]).zeros_like();
        let items = zeros.as_list().unwrap();

        let (weights, biases) = items[0].as_dense().unwrap();
        assert_eq!(weights, &Array2::<f32>::zeros((2, 2)));
        assert_eq!(biases, &Array1::<f32>::zeros(2));
        assert_eq!(items[1], Params::Empty);
    }

    #[test]
    fn test_zip_with_combines_values() {
        let sum = leaf().zip_with(&leaf(), |a, b| a + b).unwrap();
        let (weights, biases) = sum.as_dense().unwrap();

        assert_eq!(weights, &array![[2.0, 4.0], [6.0, 8.0]]);
        assert_eq!(biases, &array![10.0, 12.0]);
    }

    #[test]
    fn test_zip_with_rejects_structure_mismatch() {
        let err = leaf().zip_with(&Params::Empty, |a, _| a).unwrap_err();
        assert_eq!(err, MlErr::StructureMismatch { what: "leaf" });
    }

    #[test]
    fn test_zip_with_rejects_shape_mismatch() {
        let other = Params::Dense {
            weights: array![[1.0], [2.0]],
            biases: array![0.0],
        };

        assert!(leaf().zip_with(&other, |a, _| a).is_err());
    }
}
