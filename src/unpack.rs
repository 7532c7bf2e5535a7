use crate::pack::verify_format;
use crate::packing::{Argb32, Argb64, Layout, Rgb30};
use crate::planes::{read_planes, read_planes_mut};
use crate::{ConvertError, ImageMut, ImageRef, ImageRefExt, Packing};

/// Split the packed pixels of the carrier image `src` back into the R, G and B planes of `dst`
///
/// Inverse of [`pack`](crate::pack). Alpha stored in the packed pixels is dropped.
pub fn unpack(
    src: &dyn ImageRef,
    dst: &mut dyn ImageMut,
    packing: Packing,
) -> Result<(), ConvertError> {
    verify_unpack(src, dst, packing)?;

    let width = dst.width();
    let height = dst.height();

    let [src_plane] = read_planes::<1>(src.planes())?;
    let dst_planes = read_planes_mut::<3>(dst.planes_mut())?;

    match packing {
        Packing::Argb32 => unpack_rows::<Argb32>(src_plane, dst_planes, width, height),
        Packing::Rgb30 => unpack_rows::<Rgb30>(src_plane, dst_planes, width, height),
        Packing::Argb64 => unpack_rows::<Argb64>(src_plane, dst_planes, width, height),
    }

    Ok(())
}

pub(crate) fn verify_unpack(
    src: &dyn ImageRef,
    dst: &dyn ImageMut,
    packing: Packing,
) -> Result<(), ConvertError> {
    verify_format(src, Packing::CARRIER)?;
    verify_format(dst, packing.source_format())?;

    if dst.width() == 0 || dst.height() == 0 {
        return Err(ConvertError::InvalidDimensions);
    }

    if src.width() != packing.carrier_width(dst.width()) || src.height() != dst.height() {
        return Err(ConvertError::MismatchedImageSize);
    }

    src.bounds_check()?;
    dst.bounds_check()?;

    Ok(())
}

fn unpack_rows<L: Layout>(
    src: (&[u8], usize),
    dst: [(&mut [u8], usize); 3],
    width: usize,
    height: usize,
) {
    let [(r, r_stride), (g, g_stride), (b, b_stride)] = dst;

    let rows = r
        .chunks_exact_mut(r_stride)
        .zip(g.chunks_exact_mut(g_stride))
        .zip(b.chunks_exact_mut(b_stride))
        .take(height);

    for (y, ((r, g), b)) in rows.enumerate() {
        unpack_row::<L>(src, y, width, [r, g, b]);
    }
}

#[inline(always)]
pub(crate) fn unpack_row<L: Layout>(
    (src, src_stride): (&[u8], usize),
    y: usize,
    width: usize,
    [r, g, b]: [&mut [u8]; 3],
) {
    let n = width * L::SAMPLE_BYTES;
    let src_row = &src[y * src_stride..][..width * L::PIXEL_BYTES];

    L::unpack_row(src_row, &mut r[..n], &mut g[..n], &mut b[..n]);
}
