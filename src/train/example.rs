use crate::error::{NetworkError, Result};

/// One labeled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub inputs: Vec<f64>,
    pub expected: Vec<f64>,
}

impl Example {
    pub fn new(inputs: Vec<f64>, expected: Vec<f64>) -> Example {
        Example { inputs, expected }
    }

    /// Builds an example from a raw `[inputs, expected]` slice; anything other
    /// than exactly two parts is rejected.
    pub fn from_parts(parts: &[Vec<f64>]) -> Result<Example> {
        match parts {
            [inputs, expected] => Ok(Example::new(inputs.clone(), expected.clone())),
            _ => Err(NetworkError::MalformedExample { parts: parts.len() }),
        }
    }
}

impl From<(Vec<f64>, Vec<f64>)> for Example {
    fn from((inputs, expected): (Vec<f64>, Vec<f64>)) -> Self {
        Example::new(inputs, expected)
    }
}
