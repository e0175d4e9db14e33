// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.


/// Helper for converting a word number to an integer with `figures` decimal
/// places kept (`38.2` with one figure is 382), or a suitable error.
pub fn num_to_int<T>(inp: f64, figures: i32, max: u16, err: impl FnOnce(f64) -> T) -> Result<u16, T> {
    let v = inp * 10f64.powi(figures);
    if v >= 0. && v.round() < max as f64 && (v.round() - v).abs() < 0.0001 {
        Ok(v.round() as u16)
    } else {
        Err(err(inp))
    }
}

#[cfg(test)]
mod tests {
    use super::num_to_int;

    #[test]
    fn tenths() {
        assert_eq!(num_to_int(0., 1, 10000, |_| ()), Ok(0));
        assert_eq!(num_to_int(1., 1, 10000, |_| ()), Ok(10));
        assert_eq!(num_to_int(38.2, 1, 10000, |_| ()), Ok(382));
        assert_eq!(num_to_int(1.25, 1, 10000, |v| v), Err(1.25));
        assert_eq!(num_to_int(1000., 1, 10000, |v| v), Err(1000.));
    }
}
