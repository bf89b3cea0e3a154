/// Fold `x` into the primary interval `[0, length)`.
///
/// Folding is done by repeated addition and subtraction of `length`, so values
/// close to the interval boundaries are treated exactly the same way every
/// time and no rounding from `x / length` sneaks in.
///
/// # Returns
///
/// * `NaN` if `length` is zero or negative, if `x` or `length` is NaN or if
///   `x` is infinite;
/// * `x` unchanged if `length` is positive infinity;
/// * the folded value otherwise.
///
/// # Examples
///
/// ```
/// # use mdpress_core::fold;
/// assert_eq!(fold(12.5, 10.0), 2.5);
/// assert_eq!(fold(-2.5, 10.0), 7.5);
/// assert!(fold(1.0, 0.0).is_nan());
/// assert_eq!(fold(-3.0, f64::INFINITY), -3.0);
/// ```
pub fn fold(x: f64, length: f64) -> f64 {
    if x.is_nan() || length.is_nan() || x.is_infinite() || length <= 0.0 {
        return f64::NAN;
    }
    if length.is_infinite() {
        return x;
    }
    let mut x = x;
    while x < 0.0 {
        x += length;
    }
    while x >= length {
        x -= length;
    }
    x
}

/// Fold `x` into `[0, length)` and keep track of the image count.
///
/// `images` is the image count before folding. Every added `length` decrements
/// it, every subtracted `length` increments it. When the count reaches the
/// bounds of `i64` folding stops there, so the returned coordinate may then lie
/// outside of the primary interval. Lengths that are not positive and finite
/// leave `x` and `images` unchanged.
pub fn fold_with_images(x: f64, images: i64, length: f64) -> (f64, i64) {
    if !(length > 0.0 && length.is_finite()) {
        return (x, images);
    }
    let mut x = x;
    let mut images = images;
    while x < 0.0 && images > i64::MIN {
        x += length;
        images -= 1;
    }
    while x >= length && images < i64::MAX {
        x -= length;
        images += 1;
    }
    (x, images)
}
