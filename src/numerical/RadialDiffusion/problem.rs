use super::error::DiffusionError;

/// Physical parameters of the pillar problem
///
/// D_eff * (d²C/dr² + (1/r) dC/dr) = S * r^k,  dC/dr(0) = 0,  C(R) = Ce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillarParameters {
    /// source term S [mol/m³/s]
    pub source: f64,
    /// exponent k of the source profile S * r^k; 0 is a uniform source
    pub source_exponent: f64,
    /// effective diffusion coefficient D_eff [m²/s]
    pub diffusivity: f64,
    /// pillar radius R [m]
    pub radius: f64,
    /// external concentration Ce [mol/m³], Dirichlet value at r = R
    pub outer_concentration: f64,
}

impl Default for PillarParameters {
    fn default() -> Self {
        PillarParameters {
            source: 2e-8,
            source_exponent: 0.0,
            diffusivity: 1e-10,
            radius: 0.5,
            outer_concentration: 20.0,
        }
    }
}

impl PillarParameters {
    pub fn new(source: f64, diffusivity: f64, radius: f64, outer_concentration: f64) -> PillarParameters {
        PillarParameters {
            source,
            source_exponent: 0.0,
            diffusivity,
            radius,
            outer_concentration,
        }
    }

    /// same problem with the power-law source S * r^k
    pub fn with_source_exponent(mut self, k: f64) -> PillarParameters {
        self.source_exponent = k;
        self
    }

    /// source term evaluated at radius r
    pub fn source_at(&self, r: f64) -> f64 {
        if self.source_exponent == 0.0 {
            self.source
        } else {
            self.source * r.powf(self.source_exponent)
        }
    }

    pub fn validate(&self) -> Result<(), DiffusionError> {
        let finite = [
            ("source", self.source),
            ("source_exponent", self.source_exponent),
            ("diffusivity", self.diffusivity),
            ("radius", self.radius),
            ("outer_concentration", self.outer_concentration),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(DiffusionError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }
        if self.diffusivity <= 0.0 {
            return Err(DiffusionError::InvalidParameter {
                name: "diffusivity",
                value: self.diffusivity,
                reason: "must be positive",
            });
        }
        if self.radius <= 0.0 {
            return Err(DiffusionError::InvalidParameter {
                name: "radius",
                value: self.radius,
                reason: "must be positive",
            });
        }
        if self.source_exponent < 0.0 {
            return Err(DiffusionError::InvalidParameter {
                name: "source_exponent",
                value: self.source_exponent,
                reason: "must be non-negative",
            });
        }
        Ok(())
    }
}
