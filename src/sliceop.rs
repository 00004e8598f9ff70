//! Element-wise helpers for the row-major `[actions x hands]` buffers used
//! by the regret tables and the traversal.

#[inline]
pub(crate) fn add_slice(lhs: &mut [f32], rhs: &[f32]) {
    debug_assert_eq!(lhs.len(), rhs.len());
    lhs.iter_mut().zip(rhs).for_each(|(l, r)| *l += *r);
}

#[inline]
pub(crate) fn add_slice_scaled(lhs: &mut [f32], rhs: &[f32], scalar: f32) {
    debug_assert_eq!(lhs.len(), rhs.len());
    lhs.iter_mut().zip(rhs).for_each(|(l, r)| *l += *r * scalar);
}

#[inline]
pub(crate) fn fma_slice(lhs: &mut [f32], rhs1: &[f32], rhs2: &[f32]) {
    debug_assert_eq!(lhs.len(), rhs1.len());
    debug_assert_eq!(lhs.len(), rhs2.len());
    lhs.iter_mut()
        .zip(rhs1.iter().zip(rhs2))
        .for_each(|(l, (r1, r2))| *l += *r1 * *r2);
}

#[inline]
pub(crate) fn row<T>(slice: &[T], index: usize, row_size: usize) -> &[T] {
    &slice[index * row_size..(index + 1) * row_size]
}

#[inline]
pub(crate) fn row_mut<T>(slice: &mut [T], index: usize, row_size: usize) -> &mut [T] {
    &mut slice[index * row_size..(index + 1) * row_size]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        let mut buf = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(row(&buf, 1, 2), &[2.0, 3.0]);
        row_mut(&mut buf, 2, 2)[0] = 9.0;
        assert_eq!(buf[4], 9.0);
    }

    #[test]
    fn test_fma_slice() {
        let mut acc = vec![1.0, 1.0];
        fma_slice(&mut acc, &[2.0, 3.0], &[10.0, 100.0]);
        assert_eq!(acc, vec![21.0, 301.0]);
    }
}
