use crate::packing::{Argb32, Argb64, Layout, Rgb30};
use crate::planes::{read_planes, read_planes_mut};
use crate::{ConvertError, ImageMut, ImageRef, ImageRefExt, Packing, PixelFormat};

/// Pack the R, G and B planes of `src` into the single plane carrier image `dst`
///
/// `src` must be in the source format of `packing` (see [`Packing::source_format`]), `dst` in
/// [`Packing::CARRIER`] with a width of [`Packing::carrier_width`] and the same height.
/// Alpha is set to opaque for packings that carry one.
pub fn pack(
    src: &dyn ImageRef,
    dst: &mut dyn ImageMut,
    packing: Packing,
) -> Result<(), ConvertError> {
    verify_pack(src, dst, packing)?;

    let width = src.width();
    let height = src.height();

    let src_planes = read_planes::<3>(src.planes())?;
    let [dst_plane] = read_planes_mut::<1>(dst.planes_mut())?;

    match packing {
        Packing::Argb32 => pack_rows::<Argb32>(src_planes, dst_plane, width, height),
        Packing::Rgb30 => pack_rows::<Rgb30>(src_planes, dst_plane, width, height),
        Packing::Argb64 => pack_rows::<Argb64>(src_planes, dst_plane, width, height),
    }

    Ok(())
}

pub(crate) fn verify_pack(
    src: &dyn ImageRef,
    dst: &dyn ImageMut,
    packing: Packing,
) -> Result<(), ConvertError> {
    verify_format(src, packing.source_format())?;
    verify_format(dst, Packing::CARRIER)?;

    if src.width() == 0 || src.height() == 0 {
        return Err(ConvertError::InvalidDimensions);
    }

    if dst.width() != packing.carrier_width(src.width()) || dst.height() != src.height() {
        return Err(ConvertError::MismatchedImageSize);
    }

    src.bounds_check()?;
    dst.bounds_check()?;

    Ok(())
}

pub(crate) fn verify_format<I: ImageRef + ?Sized>(
    image: &I,
    expected: PixelFormat,
) -> Result<(), ConvertError> {
    let got = image.format();

    if got != expected {
        return Err(ConvertError::MismatchedFormat { expected, got });
    }

    Ok(())
}

fn pack_rows<L: Layout>(
    src: [(&[u8], usize); 3],
    (dst, dst_stride): (&mut [u8], usize),
    width: usize,
    height: usize,
) {
    let rows = dst.chunks_exact_mut(dst_stride).take(height);

    for (y, dst_row) in rows.enumerate() {
        pack_row::<L>(&src, y, width, dst_row);
    }
}

#[inline(always)]
pub(crate) fn pack_row<L: Layout>(
    src: &[(&[u8], usize); 3],
    y: usize,
    width: usize,
    dst_row: &mut [u8],
) {
    let n = width * L::SAMPLE_BYTES;
    let [r, g, b] = src.map(|(plane, stride)| &plane[y * stride..][..n]);

    L::pack_row(r, g, b, &mut dst_row[..width * L::PIXEL_BYTES]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Image;

    #[test]
    fn run_pack() {
        let width = 1920;
        let height = 1080;

        for packing in [Packing::Argb32, Packing::Rgb30, Packing::Argb64] {
            let src = Image::blank(packing.source_format(), width, height);
            let mut dst = Image::blank(Packing::CARRIER, packing.carrier_width(width), height);

            pack(&src, &mut dst, packing).unwrap();
        }
    }

    #[test]
    fn run_pack_custom_strides() {
        let width = 1917;
        let height = 1080;

        for packing in [Packing::Argb32, Packing::Rgb30, Packing::Argb64] {
            let src = Image::blank_aligned(packing.source_format(), width, height, 64);
            let mut dst =
                Image::blank_aligned(Packing::CARRIER, packing.carrier_width(width), height, 128);

            pack(&src, &mut dst, packing).unwrap();
        }
    }

    #[test]
    fn alpha_is_opaque() {
        let src = Image::blank(PixelFormat::RGB24, 3, 2);
        let mut dst = Image::blank(Packing::CARRIER, 3, 2);

        pack(&src, &mut dst, Packing::Argb32).unwrap();

        let (plane, _) = dst.planes().next().unwrap();
        for px in plane.chunks_exact(4) {
            let word = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
            assert_eq!(word, 0xFF00_0000);
        }
    }

    #[test]
    fn wrong_source_format() {
        let src = Image::blank(PixelFormat::RGB30, 4, 4);
        let mut dst = Image::blank(Packing::CARRIER, 4, 4);

        let err = pack(&src, &mut dst, Packing::Argb32).unwrap_err();

        assert!(matches!(
            err,
            ConvertError::MismatchedFormat {
                expected: PixelFormat::RGB24,
                got: PixelFormat::RGB30
            }
        ));
    }

    #[test]
    fn zero_width_is_rejected() {
        let src = Image::blank(PixelFormat::RGB24, 0, 4);
        let mut dst = Image::blank(Packing::CARRIER, 0, 4);

        let err = pack(&src, &mut dst, Packing::Argb32).unwrap_err();

        assert!(matches!(err, ConvertError::InvalidDimensions));
    }

    #[test]
    fn carrier_must_be_twice_as_wide_for_argb64() {
        let src = Image::blank(PixelFormat::RGB48, 4, 4);
        let mut dst = Image::blank(Packing::CARRIER, 4, 4);

        let err = pack(&src, &mut dst, Packing::Argb64).unwrap_err();

        assert!(matches!(err, ConvertError::MismatchedImageSize));
    }
}
