//! Solar Geometry
//!
//! Computes the position of the sun and the resulting shortwave flux on a
//! (possibly sloped) surface for a single instant and location.
//!
//! # What This Module Does
//!
//! 1. Converts the instant to UTC and takes the fractional hour and day of year
//! 2. Computes declination, elevation, zenith and azimuth of the sun
//! 3. Computes the angle of incidence on the receiving surface
//! 4. Attenuates the solar constant for incidence, cloud cover and albedo
//!
//! # Approximations
//!
//! - Declination uses a fixed axial tilt of 0.409 rad with the solstice on day 173.
//! - Local apparent solar time has no equation of time correction.
//! - Latitudes near the poles are not bounds-checked; results there are whatever
//!   the closed-form expressions give.
//!
//! Below the horizon the flux is exactly zero: the angle of incidence is set to
//! the zenith angle, whose cosine is negative, and negative cosines give no flux.

use crate::parameters::SolarParameters;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use lumps_core::errors::{LumpsError, LumpsResult};
use lumps_core::location::{CloudCoverage, Location};
use lumps_core::standard_variables::VAR_NET_RADIATION;
use lumps_core::timeseries::{EnergyBalanceSeries, FloatValue};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Solar "constant" (W / m^2)
pub const SOLAR_CONSTANT: FloatValue = 1366.0;

/// Amplitude of the declination cycle (rad)
const AXIAL_TILT: FloatValue = 0.409;

/// Day of year of the northern summer solstice
const SOLSTICE_DAY: FloatValue = 173.0;

/// Intermediate and final quantities of the radiation calculation.
///
/// Angles are in radians and times in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiationVariables {
    pub hour_fraction: FloatValue,
    pub solar_declination: FloatValue,
    pub elevation_angle: FloatValue,
    pub zenith_angle: FloatValue,
    pub local_solar_time: FloatValue,
    pub solar_azimuth: FloatValue,
    pub angle_of_incidence: FloatValue,
    /// Flux after the incidence angle only
    pub flux_at_angle: FloatValue,
    /// Flux after incidence and cloud attenuation
    pub flux_with_clouds: FloatValue,
    /// Flux after incidence, clouds and albedo
    pub flux_with_albedo: FloatValue,
    /// Net downward shortwave flux (W / m^2)
    pub flux: FloatValue,
}

/// Net downward shortwave flux for an instant and location (W / m^2).
pub fn calc_radiation_flux<Tz: TimeZone>(
    instant: &DateTime<Tz>,
    location: &Location,
    parameters: &SolarParameters,
) -> FloatValue {
    get_radiation_variables(instant, location, parameters).flux
}

/// Full radiation calculation for an instant and location.
pub fn get_radiation_variables<Tz: TimeZone>(
    instant: &DateTime<Tz>,
    location: &Location,
    parameters: &SolarParameters,
) -> RadiationVariables {
    let utc = instant.with_timezone(&Utc);

    let longitude = location.longitude.to_radians();
    let latitude = location.latitude.to_radians();
    let slope_angle = parameters.slope_angle.to_radians();
    let slope_azimuth = parameters.slope_azimuth.to_radians();

    let hour_fraction = hour_fraction(&utc);
    let solar_declination = solar_declination_angle(utc.ordinal());
    let elevation_angle = elevation_angle(hour_fraction, latitude, longitude, solar_declination);
    let zenith_angle = to_zenith_angle(elevation_angle);
    let local_solar_time = local_apparent_solar_time(hour_fraction, longitude);
    let solar_azimuth =
        solar_azimuth_angle(latitude, solar_declination, zenith_angle, local_solar_time);
    let angle_of_incidence =
        angle_of_incidence(slope_angle, slope_azimuth, solar_azimuth, zenith_angle);

    let flux_at_angle = flux_at_angle(SOLAR_CONSTANT, angle_of_incidence);
    let flux_with_clouds = transmissivity(&parameters.clouds, elevation_angle) * flux_at_angle;
    let flux_with_albedo = flux_with_clouds * (1.0 - parameters.albedo);

    RadiationVariables {
        hour_fraction,
        solar_declination,
        elevation_angle,
        zenith_angle,
        local_solar_time,
        solar_azimuth,
        angle_of_incidence,
        flux_at_angle,
        flux_with_clouds,
        flux_with_albedo,
        flux: flux_with_albedo,
    }
}

/// UTC hour of day including minutes.
pub fn hour_fraction(utc: &DateTime<Utc>) -> FloatValue {
    utc.hour() as FloatValue + utc.minute() as FloatValue / 60.0
}

/// Solar declination (rad) for a day of year.
///
/// $$\delta = 0.409 \cos\left(2\pi \frac{d - 173}{365}\right)$$
pub fn solar_declination_angle(day_of_year: u32) -> FloatValue {
    AXIAL_TILT * (TAU * (day_of_year as FloatValue - SOLSTICE_DAY) / 365.0).cos()
}

/// Elevation of the sun above the horizon (rad).
///
/// Latitude, longitude (positive west) and declination are in radians.
pub fn elevation_angle(
    hour_fraction: FloatValue,
    latitude: FloatValue,
    longitude: FloatValue,
    solar_declination: FloatValue,
) -> FloatValue {
    (latitude.sin() * solar_declination.sin()
        - latitude.cos() * solar_declination.cos() * (TAU * hour_fraction / 24.0 - longitude).cos())
    .asin()
}

pub fn to_zenith_angle(elevation_angle: FloatValue) -> FloatValue {
    FRAC_PI_2 - elevation_angle
}

/// Local apparent solar time (hours), without equation of time correction.
pub fn local_apparent_solar_time(hour_fraction: FloatValue, longitude: FloatValue) -> FloatValue {
    hour_fraction - longitude / TAU * 24.0
}

/// Solar azimuth clockwise from north (rad).
///
/// The cosine is clamped to $[-1, 1]$ since it overshoots near sunrise and
/// sunset. Afternoon azimuths are reflected to $2\pi - \alpha$. With the sun
/// overhead the azimuth is undefined and taken as 0.
pub fn solar_azimuth_angle(
    latitude: FloatValue,
    solar_declination: FloatValue,
    zenith_angle: FloatValue,
    local_apparent_solar_time: FloatValue,
) -> FloatValue {
    let h = TAU / 24.0 * (12.0 - local_apparent_solar_time);
    let ratio = (solar_declination.sin() * latitude.cos()
        - solar_declination.cos() * latitude.sin())
        * h.cos()
        / zenith_angle.sin();
    let cos_azimuth = if ratio.is_nan() {
        1.0
    } else {
        ratio.clamp(-1.0, 1.0)
    };

    let azimuth = cos_azimuth.acos();
    if local_apparent_solar_time > 12.0 {
        TAU - azimuth
    } else {
        azimuth
    }
}

/// Angle between the solar beam and the surface normal (rad).
///
/// With the sun below the horizon the zenith angle is returned unchanged so
/// that the flux calculation sees a negative cosine.
pub fn angle_of_incidence(
    slope_angle: FloatValue,
    slope_azimuth: FloatValue,
    solar_azimuth: FloatValue,
    zenith_angle: FloatValue,
) -> FloatValue {
    if zenith_angle.cos() < 0.0 {
        return zenith_angle;
    }
    (slope_angle.cos() * zenith_angle.cos()
        + slope_angle.sin() * zenith_angle.sin() * (solar_azimuth - slope_azimuth).cos())
    .acos()
}

/// Flux on a surface from a beam of `perpendicular_flux` (W / m^2).
///
/// Surfaces facing away from the beam receive nothing.
pub fn flux_at_angle(perpendicular_flux: FloatValue, angle_of_incidence: FloatValue) -> FloatValue {
    let cos_incidence = angle_of_incidence.cos();
    if cos_incidence < 0.0 {
        0.0
    } else {
        perpendicular_flux * cos_incidence
    }
}

/// Atmospheric transmissivity of the direct beam.
///
/// $$\tau = (0.6 + 0.2 \sin\psi)(1 - 0.4 \sigma_H)(1 - 0.7 \sigma_M)(1 - 0.4 \sigma_L)$$
pub fn transmissivity(clouds: &CloudCoverage, elevation_angle: FloatValue) -> FloatValue {
    (0.6 + 0.2 * elevation_angle.sin())
        * (1.0 - 0.4 * clouds.high)
        * (1.0 - 0.7 * clouds.medium)
        * (1.0 - 0.4 * clouds.low)
}

/// Modelled net shortwave radiation over one local day.
///
/// Evaluates the flux every `step_minutes` from local midnight of `date` in
/// `timezone` and returns it as the net radiation column of a new series. The
/// result can be passed to the storage component to compare the hysteresis of
/// modelled and observed radiation.
pub fn day_radiation_series<Tz: TimeZone>(
    date: NaiveDate,
    timezone: &Tz,
    location: &Location,
    parameters: &SolarParameters,
    step_minutes: u32,
) -> LumpsResult<EnergyBalanceSeries> {
    if step_minutes == 0 {
        return Err(LumpsError::InvalidArgument(
            "step_minutes must be positive".to_string(),
        ));
    }
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| timezone.from_local_datetime(&naive).earliest())
        .ok_or_else(|| {
            LumpsError::InvalidArgument(format!("Local midnight of {} does not exist", date))
        })?;

    let times: Vec<DateTime<Utc>> = (0..24 * 60 / step_minutes)
        .map(|i| (midnight.clone() + Duration::minutes((i * step_minutes) as i64)).with_timezone(&Utc))
        .collect();
    let fluxes: Array1<FloatValue> = times
        .iter()
        .map(|t| calc_radiation_flux(t, location, parameters))
        .collect();

    EnergyBalanceSeries::new(times).with_column(VAR_NET_RADIATION.name, fluxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::FixedOffset;

    fn vancouver() -> Location {
        Location::new(49.25, 123.1, "US/Pacific")
    }

    /// Pacific standard time
    fn pst(month: u32, day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, month, day, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_flux_zero_at_night() {
        let flux = calc_radiation_flux(&pst(3, 5, 0), &vancouver(), &SolarParameters::default());
        assert_abs_diff_eq!(flux, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_solar_declination() {
        let declination = solar_declination_angle(64);
        assert_abs_diff_eq!(declination.to_degrees(), -7.05, epsilon = 0.1);
    }

    #[test]
    fn test_elevation_angle() {
        let vars = get_radiation_variables(&pst(3, 5, 15), &vancouver(), &SolarParameters::default());
        assert_abs_diff_eq!(vars.elevation_angle.to_degrees(), 22.9, epsilon = 0.1);
    }

    #[test]
    fn test_azimuth_angle() {
        let vars = get_radiation_variables(&pst(2, 4, 15), &vancouver(), &SolarParameters::default());
        assert_abs_diff_eq!(vars.solar_azimuth.to_degrees(), 225.4, epsilon = 0.1);
    }

    #[test]
    fn test_to_zenith_angle() {
        let zenith = to_zenith_angle(20.0_f64.to_radians());
        assert_abs_diff_eq!(zenith.to_degrees(), 70.0, epsilon = 1e-10);
    }

    #[test]
    fn test_angle_of_incidence_is_zenith_for_no_slope() {
        let zenith = 40.0_f64.to_radians();
        let angle = angle_of_incidence(0.0, 0.0, 20.0_f64.to_radians(), zenith);
        assert_abs_diff_eq!(angle, zenith, epsilon = 1e-10);
    }

    #[test]
    fn test_angle_of_incidence_below_horizon() {
        let zenith = 120.0_f64.to_radians();
        assert_eq!(angle_of_incidence(0.3, 1.0, 2.0, zenith), zenith);
        assert_eq!(flux_at_angle(SOLAR_CONSTANT, zenith), 0.0);
    }

    #[test]
    fn test_lannemezan_local_apparent_solar_time() {
        let lannemezan = Location::new(
            43.0 + 6.0 / 60.0 + 32.9 / 360.0,
            -21.0 / 60.0 - 32.1 / 360.0,
            "Europe/Paris",
        );
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        let instant = cest.with_ymd_and_hms(2011, 6, 25, 12, 0, 0).unwrap();

        let vars = get_radiation_variables(&instant, &lannemezan, &SolarParameters::default());
        assert_abs_diff_eq!(vars.local_solar_time, 9.0 + 59.0 / 60.0, epsilon = 0.5);
    }

    #[test]
    fn test_azimuth_ratio_is_clamped() {
        // Sun almost overhead: the raw cosine ratio is far outside [-1, 1]
        let morning = solar_azimuth_angle(0.0, 0.4, 0.01, 12.0);
        assert_eq!(morning, 0.0);

        let afternoon = solar_azimuth_angle(0.0, 0.4, 0.01, 13.0);
        assert!(afternoon.is_finite());
        assert_abs_diff_eq!(afternoon, TAU, epsilon = 1e-10);
    }

    #[test]
    fn test_azimuth_at_subsolar_point() {
        // Latitude equals declination at local noon: zenith is exactly 0
        let azimuth = solar_azimuth_angle(0.3, 0.3, 0.0, 12.0);
        assert_eq!(azimuth, 0.0);

        let incidence = angle_of_incidence(0.3, 1.0, azimuth, 0.0);
        assert_abs_diff_eq!(incidence, 0.3, epsilon = 1e-12);
        let flux = flux_at_angle(SOLAR_CONSTANT, incidence);
        assert!(flux.is_finite());
        assert_abs_diff_eq!(flux, SOLAR_CONSTANT * 0.3_f64.cos(), epsilon = 1e-9);
    }

    #[test]
    fn test_flux_is_zero_whenever_sun_is_below_horizon() {
        let location = vancouver();
        let params = SolarParameters::default();
        let start = pst(12, 21, 0);

        let mut n_night = 0;
        for minute in (0..24 * 60).step_by(5) {
            let instant = start + Duration::minutes(minute);
            let vars = get_radiation_variables(&instant, &location, &params);
            if vars.elevation_angle < 0.0 {
                n_night += 1;
                assert_eq!(vars.flux, 0.0, "Non-zero flux at {}", instant);
            } else {
                assert!(vars.flux >= 0.0);
            }
        }
        assert!(n_night > 0);
    }

    #[test]
    fn test_flux_is_maximal_at_local_solar_noon() {
        let location = vancouver();
        let params = SolarParameters::default();

        for (month, day) in [(2, 4), (6, 21), (9, 1)] {
            let start = pst(month, day, 0);
            let (best_time, _) = (0..24 * 60)
                .map(|minute| {
                    let vars =
                        get_radiation_variables(&(start + Duration::minutes(minute)), &location, &params);
                    (vars.local_solar_time, vars.flux)
                })
                .fold((0.0, f64::NEG_INFINITY), |best, current| {
                    if current.1 > best.1 {
                        current
                    } else {
                        best
                    }
                });

            assert_abs_diff_eq!(best_time, 12.0, epsilon = 1.0 / 60.0);
        }
    }

    #[test]
    fn test_clouds_and_albedo_attenuate() {
        let location = vancouver();
        let instant = pst(6, 21, 12);
        let clear = get_radiation_variables(&instant, &location, &SolarParameters::default());
        let cloudy = get_radiation_variables(
            &instant,
            &location,
            &SolarParameters {
                clouds: CloudCoverage::new(1.0, 0.0, 0.0),
                albedo: 0.18,
                ..SolarParameters::default()
            },
        );

        assert_abs_diff_eq!(cloudy.flux_at_angle, clear.flux_at_angle, epsilon = 1e-10);
        assert_abs_diff_eq!(cloudy.flux_with_clouds, 0.6 * clear.flux_with_clouds, epsilon = 1e-8);
        assert_abs_diff_eq!(cloudy.flux, 0.82 * cloudy.flux_with_clouds, epsilon = 1e-8);
    }

    #[test]
    fn test_transmissivity() {
        let overcast = CloudCoverage::new(1.0, 1.0, 1.0);
        let expected = 0.8 * 0.6 * 0.3 * 0.6;
        assert_abs_diff_eq!(transmissivity(&overcast, FRAC_PI_2), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(transmissivity(&CloudCoverage::clear(), 0.0), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_day_radiation_series() {
        let mountain = FixedOffset::west_opt(6 * 3600).unwrap();
        let murray = Location::new(40.6725, 111.8022, "US/Mountain");
        let date = NaiveDate::from_ymd_opt(2005, 8, 20).unwrap();

        let series =
            day_radiation_series(date, &mountain, &murray, &SolarParameters::with_albedo(0.18), 10)
                .unwrap();

        assert_eq!(series.len(), 144);
        let flux = series.column("net_radiation").unwrap();
        assert_eq!(flux[0], 0.0);
        assert!(flux.iter().cloned().fold(0.0, f64::max) > 500.0);
        assert!(day_radiation_series(date, &mountain, &murray, &SolarParameters::default(), 0).is_err());
    }
}
