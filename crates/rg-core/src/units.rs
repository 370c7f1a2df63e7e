// rg-core/src/units.rs

use uom::si::f64::{Length as UomLength, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Time = UomTime;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn days(v: f64) -> Time {
    use uom::si::time::day;
    Time::new::<day>(v)
}

#[inline]
pub fn in_meters(l: Length) -> f64 {
    use uom::si::length::meter;
    l.get::<meter>()
}

#[inline]
pub fn in_days(t: Time) -> f64 {
    use uom::si::time::day;
    t.get::<day>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        assert!((in_meters(m(2.0)) - 2.0).abs() < 1e-12);
        assert!((in_days(days(31.0)) - 31.0).abs() < 1e-9);
    }

    #[test]
    fn day_is_86400_seconds() {
        use uom::si::time::second;
        assert!((days(1.0).get::<second>() - 86_400.0).abs() < 1e-9);
    }
}
