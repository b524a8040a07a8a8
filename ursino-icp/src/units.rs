//! Dimensioned quantities used by the cerebral hemodynamics model.
//!
//! Every physiological value in this crate is a [`uom`] quantity stored in SI
//! base units. The model's literature values are quoted in clinical units
//! (mmHg, ml, s), so the [`Clinical`] trait converts to and from those units
//! for each quantity the model touches.

use uom::{
    si::{
        ISQ, Quantity, SI,
        f64::{Pressure, Time, Volume, VolumeRate},
        pressure::millimeter_of_mercury,
        time::second,
        volume::milliliter,
    },
    typenum::{N1, N3, N4, N5, N6, P1, P2, P3, P4, Z0},
};

/// Arterial compliance, m⁴·s²/kg (m³/Pa) in SI.
///
/// Clinically quoted in ml/mmHg.
pub type Compliance = Quantity<ISQ<P4, N1, P2, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Rate of change of compliance, m⁴·s/kg in SI.
pub type ComplianceRate = Quantity<ISQ<P4, N1, P1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Hydraulic resistance, Pa·s/m³ in SI.
///
/// Pressure drop per unit of volumetric flow, clinically quoted in mmHg·s/ml.
pub type HydraulicResistance = Quantity<ISQ<N4, P1, N1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Proportionality coefficient of the arterial resistance law, Pa³·s/m³ in SI.
///
/// Multiplied by a compliance squared and divided by a volume squared it
/// yields a [`HydraulicResistance`].
pub type ResistanceCoefficient = Quantity<ISQ<N6, P3, N5, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Intracranial elastance coefficient, 1/m³ in SI.
pub type ElastanceCoefficient = Quantity<ISQ<N3, Z0, Z0, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Rate of change of pressure, Pa/s in SI.
pub type PressureRate = Quantity<ISQ<N1, P1, N3, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Conversion between a quantity and its clinical unit.
///
/// # Example
///
/// ```
/// use ursino_icp::units::{Clinical, Compliance};
///
/// let compliance = Compliance::clinical(0.15);
/// assert!((compliance.in_clinical() - 0.15).abs() < 1e-12);
/// assert_eq!(Compliance::UNIT, "ml/mmHg");
/// ```
pub trait Clinical: Sized {
    /// Symbol of the clinical unit.
    const UNIT: &'static str;

    /// Creates the quantity from a value expressed in [`Self::UNIT`].
    fn clinical(value: f64) -> Self;

    /// Returns the value expressed in [`Self::UNIT`].
    fn in_clinical(self) -> f64;
}

fn mmhg() -> Pressure {
    Pressure::new::<millimeter_of_mercury>(1.0)
}

fn ml() -> Volume {
    Volume::new::<milliliter>(1.0)
}

fn seconds() -> Time {
    Time::new::<second>(1.0)
}

macro_rules! clinical {
    ($quantity:ty, $unit:literal, $per_unit:expr) => {
        impl Clinical for $quantity {
            const UNIT: &'static str = $unit;

            fn clinical(value: f64) -> Self {
                let per_unit: $quantity = $per_unit;
                per_unit * value
            }

            fn in_clinical(self) -> f64 {
                (self / Self::clinical(1.0)).value
            }
        }
    };
}

clinical!(Pressure, "mmHg", mmhg());
clinical!(Volume, "ml", ml());
clinical!(Time, "s", seconds());
clinical!(VolumeRate, "ml/s", ml() / seconds());
clinical!(Compliance, "ml/mmHg", ml() / mmhg());
clinical!(ComplianceRate, "ml/mmHg/s", ml() / mmhg() / seconds());
clinical!(HydraulicResistance, "mmHg·s/ml", mmhg() * seconds() / ml());
clinical!(
    ResistanceCoefficient,
    "mmHg³·s/ml",
    mmhg() * mmhg() * mmhg() * seconds() / ml()
);
clinical!(ElastanceCoefficient, "1/ml", ml().recip());
clinical!(PressureRate, "mmHg/s", mmhg() / seconds());
