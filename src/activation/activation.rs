use std::f64::consts::E;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationFunction {
    /// Output layers.
    Sigmoid,
    /// Hidden layers; fixed alpha of 1.
    Elu,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Elu => if x >= 0.0 { x } else { E.powf(x) - 1.0 },
        }
    }

    /// Element-wise derivative, evaluated on the cached pre-activation value
    /// rather than on the activation.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let ex = E.powf(x);
                ex / ((1.0 + ex) * (1.0 + ex))
            },
            ActivationFunction::Elu => if x >= 0.0 { 1.0 } else { E.powf(x) },
        }
    }
}
