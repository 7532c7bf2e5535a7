use crate::{PixelFormat, StrictApi};
use std::mem::MaybeUninit;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("got invalid number of planes, expected {expected} but only got {got}")]
pub struct InvalidNumberOfPlanesError {
    pub expected: usize,
    pub got: usize,
}

pub(crate) fn read_planes<'a, const N: usize>(
    mut iter: impl Iterator<Item = (&'a [u8], usize)>,
) -> Result<[(&'a [u8], usize); N], InvalidNumberOfPlanesError> {
    let mut out: [(&'a [u8], usize); N] = [(&[], 0); N];

    for (i, out) in out.iter_mut().enumerate() {
        *out = iter.next().ok_or(InvalidNumberOfPlanesError {
            expected: N,
            got: i,
        })?;
    }

    Ok(out)
}

pub(crate) fn read_planes_mut<'a, const N: usize>(
    mut iter: impl Iterator<Item = (&'a mut [u8], usize)>,
) -> Result<[(&'a mut [u8], usize); N], InvalidNumberOfPlanesError> {
    let mut out: [MaybeUninit<(&'a mut [u8], usize)>; N] = [const { MaybeUninit::uninit() }; N];

    for (i, out) in out.iter_mut().enumerate() {
        out.write(iter.next().ok_or(InvalidNumberOfPlanesError {
            expected: N,
            got: i,
        })?);
    }

    // Safety: every element was written above, the loop returns early otherwise
    Ok(out.map(|plane| unsafe { plane.assume_init() }))
}

/// Infer the planes for an image in the given format stored in a single contiguous buffer
///
/// Planes follow each other directly, each taking `stride * plane_height` bytes.
/// Strides default to the packed strides of the format.
///
/// # Panics
///
/// If `buf` is too small for the given dimensions or the number of `strides` differs from the
/// number of planes of `format` this function will panic
#[deny(clippy::arithmetic_side_effects)]
pub fn infer<S: AnySlice>(
    format: PixelFormat,
    mut buf: S,
    width: usize,
    height: usize,
    strides: Option<&[usize]>,
) -> Vec<S> {
    let strides = match strides {
        Some(strides) => {
            assert_eq!(strides.len(), format.num_planes());
            strides.to_vec()
        }
        None => format.packed_strides(width),
    };

    let mut out = Vec::with_capacity(strides.len());

    for (desc, stride) in format.plane_descs().zip(strides) {
        let split_at = desc.height_op.op(height).strict_mul_(stride);

        let (prev, rem) = buf.slice_split_at(split_at);

        out.push(prev);
        buf = rem;
    }

    out
}

/// Helper trait implemented on &[T] and &mut [T]
#[diagnostic::on_unimplemented(message = "AnySlice is only implemented for &[T] and &mut [T].\n\
               When using or Vec<T> or similar try .as_slice() or .as_mut_slice()")]
pub trait AnySlice: sealed::Sealed + Default + Sized {
    fn slice_len(&self) -> usize;
    fn slice_split_at(self, at: usize) -> (Self, Self);
}

mod sealed {
    pub trait Sealed {}
    impl<T> Sealed for &[T] {}
    impl<T> Sealed for &mut [T] {}
}

impl<T> AnySlice for &[T] {
    fn slice_len(&self) -> usize {
        self.len()
    }

    fn slice_split_at(self, at: usize) -> (Self, Self) {
        self.split_at(at)
    }
}

impl<T> AnySlice for &mut [T] {
    fn slice_len(&self) -> usize {
        self.len()
    }

    fn slice_split_at(self, at: usize) -> (Self, Self) {
        self.split_at_mut(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_rgb_planes() {
        let buf: Vec<u8> = (0..24).collect();
        let planes = infer(PixelFormat::RGB24, &buf[..], 4, 2, None);

        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0], &buf[0..8]);
        assert_eq!(planes[1], &buf[8..16]);
        assert_eq!(planes[2], &buf[16..24]);
    }

    #[test]
    fn infer_with_padded_strides() {
        let mut buf = vec![0u8; 6 * 2 * 3];
        let planes = infer(PixelFormat::RGB24, &mut buf[..], 4, 2, Some(&[6, 6, 6]));

        assert!(planes.iter().all(|plane| plane.len() == 12));
    }

    #[test]
    #[should_panic]
    fn infer_with_wrong_number_of_strides() {
        let buf = vec![0u8; 24];

        infer(PixelFormat::RGB24, &buf[..], 4, 2, Some(&[4, 4]));
    }

    #[test]
    fn read_planes_too_few() {
        let plane = [0u8; 4];
        let err = read_planes::<3>([(&plane[..], 4)].into_iter()).unwrap_err();

        assert_eq!(
            err,
            InvalidNumberOfPlanesError {
                expected: 3,
                got: 1
            }
        );
    }
}
