//! Spatial grid layout and meshers.
//!
//! A [`FdmLinearOpLayout`] describes the index space of a (possibly
//! multi-dimensional) grid as a flat array with the first dimension varying
//! fastest.  A [`FdmMesher`] attaches coordinates to the layout's points —
//! for the pricing operators, the logarithm of the underlying price along
//! direction 0.

use fdm_core::{errors::Error, errors::Result, Real, Size, Time};
use fdm_processes::GeneralizedBlackScholesProcess;

// ─── Layout ───────────────────────────────────────────────────────────────────

/// The index space of a grid: per-dimension sizes and the canonical flat
/// enumeration.
///
/// The flat index decodes with the **first dimension varying fastest**:
/// `index = c[0] + c[1]·dim[0] + c[2]·dim[0]·dim[1] + …`.  Consumers that
/// slice the first `dim(0)` entries of a full-grid vector therefore get the
/// complete first axis at the origin of all higher dimensions; the solver
/// relies on this documented order.
#[derive(Debug, Clone)]
pub struct FdmLinearOpLayout {
    dim: Vec<Size>,
    size: Size,
}

impl FdmLinearOpLayout {
    /// Create a layout from per-dimension point counts.
    pub fn new(dim: Vec<Size>) -> Self {
        let size = dim.iter().product();
        Self { dim, size }
    }

    /// Total number of grid points.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Per-dimension point counts.
    pub fn dim(&self) -> &[Size] {
        &self.dim
    }

    /// Iterate over every grid point in canonical order.
    pub fn iter(&self) -> FdmLayoutIter<'_> {
        FdmLayoutIter {
            layout: self,
            index: 0,
        }
    }
}

/// A position inside a layout: the flat index plus the decoded per-dimension
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpIterator {
    index: Size,
    coordinates: Vec<Size>,
}

impl FdmLinearOpIterator {
    /// The flat (sequential) index of this point.
    pub fn index(&self) -> Size {
        self.index
    }

    /// Per-dimension integer coordinates of this point.
    pub fn coordinates(&self) -> &[Size] {
        &self.coordinates
    }
}

/// Iterator over the points of a [`FdmLinearOpLayout`].
#[derive(Debug)]
pub struct FdmLayoutIter<'a> {
    layout: &'a FdmLinearOpLayout,
    index: Size,
}

impl Iterator for FdmLayoutIter<'_> {
    type Item = FdmLinearOpIterator;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.layout.size {
            return None;
        }
        let mut rest = self.index;
        let coordinates = self
            .layout
            .dim
            .iter()
            .map(|&d| {
                let c = rest % d;
                rest /= d;
                c
            })
            .collect();
        let item = FdmLinearOpIterator {
            index: self.index,
            coordinates,
        };
        self.index += 1;
        Some(item)
    }
}

// ─── Mesher trait ─────────────────────────────────────────────────────────────

/// A spatial mesh: a layout plus real-valued coordinates per point and
/// direction.
pub trait FdmMesher: std::fmt::Debug {
    /// The index layout of the mesh.
    fn layout(&self) -> &FdmLinearOpLayout;

    /// Coordinate of a grid point along `direction`.
    fn location(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real;

    /// The ordered coordinate vector along one axis (all other coordinates
    /// at the origin).
    fn axis_locations(&self, direction: Size) -> Vec<Real>;
}

// ─── 1-D mesher ───────────────────────────────────────────────────────────────

/// A one-dimensional mesh over an explicit, strictly increasing location
/// vector.
#[derive(Debug)]
pub struct Fdm1dMesher {
    layout: FdmLinearOpLayout,
    locations: Vec<Real>,
}

impl Fdm1dMesher {
    /// Create a mesh from explicit locations.
    ///
    /// # Errors
    /// Fails unless there are at least 3 points in strictly increasing order.
    pub fn new(locations: Vec<Real>) -> Result<Self> {
        if locations.len() < 3 {
            return Err(Error::Configuration(format!(
                "a mesh needs at least 3 points, got {}",
                locations.len()
            )));
        }
        if !locations.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::Configuration(
                "mesh locations must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            layout: FdmLinearOpLayout::new(vec![locations.len()]),
            locations,
        })
    }

    /// The location vector.
    pub fn locations(&self) -> &[Real] {
        &self.locations
    }
}

impl FdmMesher for Fdm1dMesher {
    fn layout(&self) -> &FdmLinearOpLayout {
        &self.layout
    }

    fn location(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        debug_assert_eq!(direction, 0, "1-D mesh has a single direction");
        self.locations[iter.coordinates()[direction]]
    }

    fn axis_locations(&self, direction: Size) -> Vec<Real> {
        debug_assert_eq!(direction, 0, "1-D mesh has a single direction");
        self.locations.clone()
    }
}

// ─── Black-Scholes mesher ─────────────────────────────────────────────────────

/// A uniform log-space mesh sized from the process volatility.
///
/// Spans `[min(ln S₀, ln K) − w, max(ln S₀, ln K) + w]` with
/// `w = 4·σ√T`, so both the spot and the strike sit well inside the grid.
#[derive(Debug)]
pub struct FdmBlackScholesMesher {
    mesher: Fdm1dMesher,
}

impl FdmBlackScholesMesher {
    /// Build a mesh of `size` points for the given process, maturity, and
    /// strike.
    pub fn new(
        size: Size,
        process: &GeneralizedBlackScholesProcess,
        maturity: Time,
        strike: Real,
    ) -> Result<Self> {
        if maturity <= 0.0 {
            return Err(Error::Configuration(format!(
                "maturity must be positive, got {maturity}"
            )));
        }
        if strike <= 0.0 {
            return Err(Error::Configuration(format!(
                "strike must be positive, got {strike}"
            )));
        }

        let spot = process.x0();
        let sigma = process.black_vol(maturity, strike);
        // Keep a usable grid width even for (near-)zero volatility
        let width = (4.0 * sigma * maturity.sqrt()).max(0.10);

        let x_spot = spot.ln();
        let x_strike = strike.ln();
        let x_min = x_spot.min(x_strike) - width;
        let x_max = x_spot.max(x_strike) + width;

        if size < 3 {
            return Err(Error::Configuration(format!(
                "a mesh needs at least 3 points, got {size}"
            )));
        }
        let dx = (x_max - x_min) / (size - 1) as Real;
        let locations = (0..size).map(|i| x_min + i as Real * dx).collect();

        Ok(Self {
            mesher: Fdm1dMesher::new(locations)?,
        })
    }
}

impl FdmMesher for FdmBlackScholesMesher {
    fn layout(&self) -> &FdmLinearOpLayout {
        self.mesher.layout()
    }

    fn location(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.mesher.location(iter, direction)
    }

    fn axis_locations(&self, direction: Size) -> Vec<Real> {
        self.mesher.axis_locations(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_enumeration_first_dimension_fastest() {
        let layout = FdmLinearOpLayout::new(vec![3, 2]);
        assert_eq!(layout.size(), 6);
        let points: Vec<_> = layout.iter().collect();
        assert_eq!(points.len(), 6);
        // index runs 0..6 with coordinates (i % 3, i / 3)
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(p.coordinates(), &[i % 3, i / 3]);
        }
        // The first dim(0) indices cover the whole first axis at the origin
        for p in points.iter().take(layout.dim()[0]) {
            assert_eq!(p.coordinates()[1], 0);
        }
    }

    #[test]
    fn one_dim_mesh_locations_round_trip() {
        let locs = vec![-1.0, -0.25, 0.5, 2.0];
        let mesher = Fdm1dMesher::new(locs.clone()).unwrap();
        let iterated: Vec<Real> = mesher
            .layout()
            .iter()
            .map(|it| mesher.location(&it, 0))
            .collect();
        assert_eq!(iterated, locs);
        assert!(iterated.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn misordered_locations_rejected() {
        assert!(matches!(
            Fdm1dMesher::new(vec![0.0, 1.0, 0.5]),
            Err(Error::Configuration(_))
        ));
        assert!(Fdm1dMesher::new(vec![0.0, 0.0, 1.0]).is_err());
        assert!(Fdm1dMesher::new(vec![0.0, 1.0]).is_err());
    }

    #[test]
    fn black_scholes_mesh_brackets_spot_and_strike() {
        let process = GeneralizedBlackScholesProcess::new(100.0, 0.05, 0.0, 0.20).unwrap();
        let mesher = FdmBlackScholesMesher::new(101, &process, 1.0, 120.0).unwrap();
        let locs = mesher.axis_locations(0);
        assert_eq!(locs.len(), 101);
        assert!(locs.windows(2).all(|w| w[0] < w[1]));
        assert!(*locs.first().unwrap() < 100.0_f64.ln());
        assert!(*locs.last().unwrap() > 120.0_f64.ln());
    }

    #[test]
    fn black_scholes_mesh_rejects_bad_inputs() {
        let process = GeneralizedBlackScholesProcess::new(100.0, 0.05, 0.0, 0.20).unwrap();
        assert!(FdmBlackScholesMesher::new(101, &process, 0.0, 100.0).is_err());
        assert!(FdmBlackScholesMesher::new(101, &process, 1.0, -5.0).is_err());
        assert!(FdmBlackScholesMesher::new(2, &process, 1.0, 100.0).is_err());
    }
}
