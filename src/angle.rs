use crate::point::Point;

const STRAIGHT: f64 = 180.0;
const FULL_TURN: f64 = 360.0;

/// Compute the angle `abc` in whole degrees, with `b` as the vertex.
///
/// The result is the interior angle between the rays `b -> a` and `b -> c`,
/// truncated towards zero, and always lies in `[0, 180]`. A zero-length ray
/// has no direction, so a vertex coinciding with either end point yields 0.
pub(crate) fn angle(a: Point, b: Point, c: Point) -> u16 {
    let ba = a - b;
    let bc = c - b;
    if ba == Point::default() || bc == Point::default() {
        return 0;
    }

    let mut degrees = (bc.atan2() - ba.atan2()).to_degrees().abs();
    if degrees > STRAIGHT {
        degrees = FULL_TURN - degrees;
    }

    // `degrees` is finite and within [0, 180] here
    degrees.clamp(0.0, STRAIGHT) as u16
}

#[cfg(test)]
mod tests {
    use super::angle;
    use crate::point::Point;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y).unwrap()
    }

    #[test]
    fn right_angle() {
        assert_eq!(angle(p(1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0)), 90);
    }

    #[test]
    fn straight_line() {
        assert_eq!(angle(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)), 180);
        assert_eq!(angle(p(0.5, 0.0), p(0.5, 0.5), p(0.5, 1.0)), 180);
    }

    #[test]
    fn folded_back() {
        assert_eq!(angle(p(2.0, 0.0), p(0.0, 0.0), p(1.0, 0.0)), 0);
    }

    #[test]
    fn coincident_vertex() {
        assert_eq!(angle(p(1.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)), 0);
        assert_eq!(angle(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 0.0)), 0);
        assert_eq!(angle(p(0.3, 0.3), p(0.3, 0.3), p(0.3, 0.3)), 0);
    }

    #[test]
    fn reflex_angles_are_reflected() {
        // rays at +135 and -135 degrees: the raw difference is 270
        assert_eq!(angle(p(-1.0, 1.0), p(0.0, 0.0), p(-1.0, -1.0)), 90);
    }

    #[test]
    fn truncates() {
        // 3-4-5 triangle, atan(4/3) is 53.13 degrees
        assert_eq!(angle(p(3.0, 0.0), p(0.0, 0.0), p(3.0, 4.0)), 53);
        assert_eq!(angle(p(4.0, 0.0), p(0.0, 0.0), p(4.0, 3.0)), 36);
    }

    #[test]
    fn symmetric() {
        let coords = [-1.0, -0.5, 0.0, 0.25, 0.5, 1.0];
        for &ax in &coords {
            for &ay in &coords {
                for &cx in &coords {
                    for &cy in &coords {
                        let a = p(ax, ay);
                        let b = p(0.25, -0.5);
                        let c = p(cx, cy);
                        assert_eq!(angle(a, b, c), angle(c, b, a), "{:?} {:?} {:?}", a, b, c);
                    }
                }
            }
        }
    }

    #[test]
    fn translation_invariant() {
        let cases = [
            (p(1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0)),
            (p(0.5, 0.25), p(0.5, 0.5), p(0.75, 0.5)),
            (p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)),
            (p(0.5, 0.25), p(0.5, 0.5), p(0.5, 0.75)),
            (p(3.0, 0.0), p(0.0, 0.0), p(3.0, 4.0)),
            (p(0.2, 0.3), p(0.4, 0.6), p(0.9, 0.1)),
        ];
        for &(a, b, c) in &cases {
            let expected = angle(a, b, c);
            for i in 0..99_u32 {
                for j in 0..99_u32 {
                    let d = p(0.01 * f64::from(i), 0.013 * f64::from(j));
                    assert_eq!(
                        angle(a + d, b + d, c + d),
                        expected,
                        "{:?} {:?} {:?} moved by {:?}",
                        a,
                        b,
                        c,
                        d
                    );
                }
            }
        }
    }

    #[test]
    fn always_in_range() {
        let coords = [-0.75, -0.25, 0.0, 0.1, 0.6, 0.9];
        for &ax in &coords {
            for &ay in &coords {
                for &bx in &coords {
                    for &cy in &coords {
                        let value = angle(p(ax, ay), p(bx, 0.1), p(0.3, cy));
                        assert!(value <= 180, "{}", value);
                    }
                }
            }
        }
    }
}
