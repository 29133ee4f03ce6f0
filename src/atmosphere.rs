//! International Standard Atmosphere density model.
//!
//! Piecewise over eight layers up to 84 852 m. Altitudes above the top
//! boundary keep using the last layer's coefficients; that region is an
//! extrapolation and has not been validated against real profiles.

const GRAVITY_MPS2: f64 = 9.80665;
const AIR_MOLAR_MASS_KG_MOL: f64 = 28.9644e-3;
const GAS_CONSTANT: f64 = 8.31432;
const DENSITY_SEA_LEVEL_KG_M3: f64 = 1.225;
const TEMPERATURE_SEA_LEVEL_K: f64 = 288.15;

/// g·M/R in K/m.
const GMR: f64 = GRAVITY_MPS2 * AIR_MOLAR_MASS_KG_MOL / GAS_CONSTANT;

#[derive(Debug, Clone, Copy)]
struct AtmosphereLayer {
    /// Base altitude (m)
    base_altitude_m: f64,
    /// Temperature at base (K)
    base_temperature_k: f64,
    /// Temperature gradient (K/km)
    gradient_k_per_km: f64,
    /// Pressure at base relative to sea level
    pressure_rel_base: f64,
}

const ISA_LAYERS: [AtmosphereLayer; 8] = [
    AtmosphereLayer {
        base_altitude_m: 0.0,
        base_temperature_k: 288.15,
        gradient_k_per_km: -6.5,
        pressure_rel_base: 1.0,
    },
    AtmosphereLayer {
        base_altitude_m: 11000.0,
        base_temperature_k: 216.65,
        gradient_k_per_km: 0.0,
        pressure_rel_base: 2.23361105092158e-1,
    },
    AtmosphereLayer {
        base_altitude_m: 20000.0,
        base_temperature_k: 216.65,
        gradient_k_per_km: 1.0,
        pressure_rel_base: 5.403295010784876e-2,
    },
    AtmosphereLayer {
        base_altitude_m: 32000.0,
        base_temperature_k: 228.65,
        gradient_k_per_km: 2.8,
        pressure_rel_base: 8.566678359291667e-3,
    },
    AtmosphereLayer {
        base_altitude_m: 47000.0,
        base_temperature_k: 270.65,
        gradient_k_per_km: 0.0,
        pressure_rel_base: 1.0945601337771144e-3,
    },
    AtmosphereLayer {
        base_altitude_m: 51000.0,
        base_temperature_k: 270.65,
        gradient_k_per_km: -2.8,
        pressure_rel_base: 6.606353132858367e-4,
    },
    AtmosphereLayer {
        base_altitude_m: 71000.0,
        base_temperature_k: 214.65,
        gradient_k_per_km: -2.0,
        pressure_rel_base: 3.904683373343926e-5,
    },
    AtmosphereLayer {
        base_altitude_m: 84852.0,
        base_temperature_k: 186.946,
        gradient_k_per_km: 0.0,
        pressure_rel_base: 3.6850095235747942e-6,
    },
];

/// Layer containing `altitude_m`. A boundary altitude belongs to the layer
/// below it; non-positive altitudes use the first layer.
fn layer_for(altitude_m: f64) -> &'static AtmosphereLayer {
    ISA_LAYERS
        .iter()
        .rev()
        .find(|layer| altitude_m > layer.base_altitude_m)
        .unwrap_or(&ISA_LAYERS[0])
}

pub fn temperature_k(altitude_m: f64) -> f64 {
    let layer = layer_for(altitude_m);
    layer.base_temperature_k
        + layer.gradient_k_per_km / 1000.0 * (altitude_m - layer.base_altitude_m)
}

/// Pressure relative to sea level.
pub fn relative_pressure(altitude_m: f64) -> f64 {
    let layer = layer_for(altitude_m);
    let gradient_per_m = layer.gradient_k_per_km / 1000.0;
    let delta_alt = altitude_m - layer.base_altitude_m;

    if gradient_per_m.abs() < 1e-10 {
        layer.pressure_rel_base * (-GMR * delta_alt / layer.base_temperature_k).exp()
    } else {
        let temperature = layer.base_temperature_k + gradient_per_m * delta_alt;
        layer.pressure_rel_base
            * (layer.base_temperature_k / temperature).powf(GMR / gradient_per_m)
    }
}

/// Air density in kg/m³ at `altitude_m`.
pub fn air_density(altitude_m: f64) -> f64 {
    DENSITY_SEA_LEVEL_KG_M3 * relative_pressure(altitude_m) * TEMPERATURE_SEA_LEVEL_K
        / temperature_k(altitude_m)
}

/// Rescale a vertical rate observed at `altitude_m` to the rate the same
/// payload would fall at at sea level, assuming drag scales with density.
///
/// Returns a magnitude; the sign of `rate_mps` is discarded.
pub fn sea_level_descent_rate(rate_mps: f64, altitude_m: f64) -> f64 {
    let density_ratio = air_density(altitude_m) / air_density(0.0);
    (density_ratio * rate_mps * rate_mps).sqrt()
}
